// src/dag/critical.rs

//! Critical path reconstruction from a computed [`Schedule`].

use std::collections::HashMap;

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler::Schedule;
use crate::types::TaskId;

/// Reconstruct one critical chain from a root to a task finishing at the
/// project finish.
///
/// Only "tight" edges are followed: the successor is critical and starts
/// exactly when the current task finishes. Among candidates the smallest id
/// wins, both for the starting root and at every branch. With single-predecessor
/// data there is exactly one such chain per critical root.
///
/// Returns an empty vector for an empty schedule.
pub fn critical_path(graph: &TaskGraph, schedule: &Schedule) -> Vec<TaskId> {
    let finish = schedule.project_finish();

    // Whether a task can reach the project finish through tight critical edges.
    let mut reaches_finish: HashMap<TaskId, bool> = HashMap::new();
    for &task in graph.topological_order().iter().rev() {
        let reaches = match schedule.get(task) {
            Some(result) if result.is_critical() => {
                result.earliest_finish == finish
                    || next_candidates(graph, schedule, task)
                        .any(|succ| reaches_finish.get(&succ).copied().unwrap_or(false))
            }
            _ => false,
        };
        reaches_finish.insert(task, reaches);
    }

    let reaches = |id: &TaskId| reaches_finish.get(id).copied().unwrap_or(false);

    let mut path = Vec::new();
    let mut current = graph.roots().into_iter().find(|id| reaches(id));

    while let Some(task) = current {
        path.push(task);
        let at_end = schedule
            .get(task)
            .is_some_and(|r| r.earliest_finish == finish);
        current = if at_end {
            None
        } else {
            next_candidates(graph, schedule, task).find(|id| reaches(id))
        };
    }

    path
}

/// Critical successors of `task` that start right as it finishes, ascending.
fn next_candidates<'a>(
    graph: &'a TaskGraph,
    schedule: &'a Schedule,
    task: TaskId,
) -> impl Iterator<Item = TaskId> + 'a {
    let finish = schedule.get(task).map(|r| r.earliest_finish);
    graph.successors_of(task).into_iter().filter(move |&succ| {
        schedule
            .get(succ)
            .is_some_and(|r| r.is_critical() && Some(r.earliest_start) == finish)
    })
}

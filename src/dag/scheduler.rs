// src/dag/scheduler.rs

//! Critical Path Method: forward pass, backward pass, slack.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::dag::critical::critical_path;
use crate::dag::graph::{Durations, TaskGraph};
use crate::errors::{CritpathError, Result};
use crate::types::{Day, TaskId};

/// Computed timing of a single task, in days relative to the schedule origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub earliest_start: Day,
    pub earliest_finish: Day,
    pub latest_start: Day,
    pub latest_finish: Day,
    /// `latest_start - earliest_start`, never negative.
    pub slack: i64,
}

impl ScheduleResult {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

/// Result of [`compute_schedule`] for one project.
///
/// Results are keyed by task id in a `BTreeMap`, so iteration order and any
/// serialised form are identical for identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    project_start: Day,
    project_finish: Day,
    tasks: BTreeMap<TaskId, ScheduleResult>,
}

impl Schedule {
    fn empty(project_start: Day) -> Self {
        Self {
            project_start,
            project_finish: project_start,
            tasks: BTreeMap::new(),
        }
    }

    pub fn project_start(&self) -> Day {
        self.project_start
    }

    pub fn project_finish(&self) -> Day {
        self.project_finish
    }

    /// Minimum project duration in days.
    pub fn duration(&self) -> i64 {
        self.project_finish.saturating_sub(self.project_start)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task: TaskId) -> Option<&ScheduleResult> {
        self.tasks.get(&task)
    }

    /// Results in ascending task id order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &ScheduleResult)> {
        self.tasks.iter().map(|(&id, result)| (id, result))
    }

    pub fn results(&self) -> &BTreeMap<TaskId, ScheduleResult> {
        &self.tasks
    }

    /// Every zero-slack task, ascending.
    pub fn critical_tasks(&self) -> Vec<TaskId> {
        self.iter()
            .filter(|(_, r)| r.is_critical())
            .map(|(id, _)| id)
            .collect()
    }

    /// One root-to-terminal chain of critical tasks spanning the whole
    /// project. See [`critical_path`].
    pub fn critical_path(&self, graph: &TaskGraph) -> Vec<TaskId> {
        critical_path(graph, self)
    }
}

/// Run the forward and backward passes over `graph`.
///
/// `durations` must hold a positive duration for every task in the graph;
/// [`TaskGraph::durations`] is the usual source. Extra entries are ignored.
///
/// The graph is trusted to be acyclic with resolvable edges (guaranteed by
/// [`TaskGraph::build`]). If the inputs still disagree, the computation stops
/// with [`CritpathError::InvariantViolation`] instead of returning numbers.
pub fn compute_schedule(
    graph: &TaskGraph,
    durations: &Durations,
    project_start: Day,
) -> Result<Schedule> {
    if graph.is_empty() {
        debug!("empty task graph; nothing to schedule");
        return Ok(Schedule::empty(project_start));
    }

    let order = graph.topological_order();
    if order.len() != graph.len() {
        return Err(invariant(format!(
            "topological order covers {} of {} tasks",
            order.len(),
            graph.len()
        )));
    }

    // Forward pass: (earliest_start, earliest_finish).
    let mut earliest: HashMap<TaskId, (Day, Day)> = HashMap::with_capacity(order.len());
    for &task in order {
        let duration = duration_for(durations, task)?;

        let mut start = project_start;
        for pred in graph.predecessors_of(task) {
            let (_, pred_finish) = earliest.get(&pred).copied().ok_or_else(|| {
                invariant(format!(
                    "predecessor {pred} of task {task} was not scheduled before it"
                ))
            })?;
            start = start.max(pred_finish);
        }

        let finish = start.checked_add(duration).ok_or_else(|| {
            invariant(format!(
                "task {task} finish overflows the day range (start {start}, duration {duration})"
            ))
        })?;
        earliest.insert(task, (start, finish));
    }

    let project_finish = graph
        .terminals()
        .iter()
        .filter_map(|id| earliest.get(id).map(|&(_, finish)| finish))
        .max()
        .ok_or_else(|| invariant("non-empty graph without terminal tasks".to_string()))?;

    // Backward pass: (latest_start, latest_finish).
    let mut latest: HashMap<TaskId, (Day, Day)> = HashMap::with_capacity(order.len());
    for &task in order.iter().rev() {
        let duration = duration_for(durations, task)?;

        let successors = graph.successors_of(task);
        let finish = if successors.is_empty() {
            project_finish
        } else {
            let mut finish = Day::MAX;
            for succ in successors {
                let (succ_start, _) = latest.get(&succ).copied().ok_or_else(|| {
                    invariant(format!(
                        "successor {succ} of task {task} was not scheduled after it"
                    ))
                })?;
                finish = finish.min(succ_start);
            }
            finish
        };

        let start = finish.checked_sub(duration).ok_or_else(|| {
            invariant(format!(
                "task {task} latest start overflows the day range (finish {finish}, duration {duration})"
            ))
        })?;
        latest.insert(task, (start, finish));
    }

    let mut tasks = BTreeMap::new();
    for &task in order {
        let (earliest_start, earliest_finish) = earliest[&task];
        let (latest_start, latest_finish) = latest[&task];

        let slack = latest_start.checked_sub(earliest_start);
        let finish_slack = latest_finish.checked_sub(earliest_finish);
        let slack = match (slack, finish_slack) {
            (Some(slack), Some(finish_slack)) if slack >= 0 && slack == finish_slack => slack,
            _ => {
                return Err(invariant(format!(
                    "task {task} has inconsistent slack (ES={earliest_start}, EF={earliest_finish}, \
                     LS={latest_start}, LF={latest_finish})"
                )));
            }
        };

        tasks.insert(
            task,
            ScheduleResult {
                earliest_start,
                earliest_finish,
                latest_start,
                latest_finish,
                slack,
            },
        );
    }

    let schedule = Schedule {
        project_start,
        project_finish,
        tasks,
    };

    info!(
        tasks = schedule.len(),
        project_start,
        project_finish,
        critical = schedule.critical_tasks().len(),
        "computed schedule"
    );

    Ok(schedule)
}

fn duration_for(durations: &Durations, task: TaskId) -> Result<i64> {
    match durations.get(&task) {
        Some(&d) if d > 0 => Ok(d),
        Some(&d) => Err(invariant(format!("task {task} has non-positive duration {d}"))),
        None => Err(invariant(format!("no duration supplied for task {task}"))),
    }
}

fn invariant(msg: String) -> CritpathError {
    CritpathError::InvariantViolation(msg)
}

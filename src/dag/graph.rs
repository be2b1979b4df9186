// src/dag/graph.rs

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::{CritpathError, Result};
use crate::types::TaskId;

/// Duration in days per task.
pub type Durations = BTreeMap<TaskId, i64>;

/// The scheduling-relevant part of a task row.
///
/// `depends_on` holds every predecessor. Project files and the current
/// storage schema only ever supply zero or one, but nothing downstream relies
/// on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub duration: i64,
    pub depends_on: Vec<TaskId>,
}

impl TaskRecord {
    pub fn new(id: TaskId, duration: i64) -> Self {
        Self {
            id,
            duration,
            depends_on: Vec::new(),
        }
    }

    pub fn after(mut self, predecessor: TaskId) -> Self {
        self.depends_on.push(predecessor);
        self
    }
}

/// Immutable dependency graph of one project's tasks.
///
/// Edges point from predecessor to successor. Construction rejects duplicate
/// ids, non-positive durations, dangling references and cycles, so a
/// `TaskGraph` value is always a valid DAG.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: DiGraphMap<TaskId, ()>,
    durations: Durations,
    /// Topological order, ties broken by ascending id.
    order: Vec<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

impl TaskGraph {
    /// Build the graph from a project's task records.
    pub fn build(tasks: &[TaskRecord]) -> Result<Self> {
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        let mut durations = Durations::new();

        for task in tasks {
            if durations.insert(task.id, task.duration).is_some() {
                return Err(CritpathError::DuplicateTask(task.id));
            }
            if task.duration <= 0 {
                return Err(CritpathError::InvalidDuration {
                    task: task.id,
                    duration: task.duration,
                });
            }
            graph.add_node(task.id);
        }

        for task in tasks {
            for &dep in task.depends_on.iter() {
                if !graph.contains_node(dep) {
                    return Err(CritpathError::DataIntegrityError {
                        task: task.id,
                        missing: dep,
                    });
                }
                graph.add_edge(dep, task.id, ());
            }
        }

        if let Some(cycle) = find_cycle(&graph) {
            return Err(CritpathError::CyclicDependencyError { cycle });
        }

        let order = stable_topological_order(&graph);

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            ?order,
            "built task graph"
        );

        Ok(Self {
            graph,
            durations,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.graph.contains_node(id)
    }

    /// All task ids, ascending.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.durations.keys().copied()
    }

    pub fn topological_order(&self) -> &[TaskId] {
        &self.order
    }

    /// Durations recorded at build time.
    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn duration_of(&self, id: TaskId) -> Option<i64> {
        self.durations.get(&id).copied()
    }

    /// Immediate predecessors, ascending. Empty for unknown ids.
    pub fn predecessors_of(&self, id: TaskId) -> Vec<TaskId> {
        sorted_neighbors(&self.graph, id, Direction::Incoming)
    }

    /// Immediate successors, ascending. Empty for unknown ids.
    pub fn successors_of(&self, id: TaskId) -> Vec<TaskId> {
        sorted_neighbors(&self.graph, id, Direction::Outgoing)
    }

    /// Tasks without predecessors, ascending.
    pub fn roots(&self) -> Vec<TaskId> {
        self.task_ids()
            .filter(|&id| {
                self.graph
                    .neighbors_directed(id, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Tasks without successors, ascending.
    pub fn terminals(&self) -> Vec<TaskId> {
        self.task_ids()
            .filter(|&id| {
                self.graph
                    .neighbors_directed(id, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .collect()
    }
}

fn sorted_neighbors(graph: &DiGraphMap<TaskId, ()>, id: TaskId, dir: Direction) -> Vec<TaskId> {
    if !graph.contains_node(id) {
        return Vec::new();
    }
    let mut out: Vec<TaskId> = graph.neighbors_directed(id, dir).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Depth-first search with white/grey/black colouring.
///
/// Roots and successors are visited in ascending id order so the reported
/// cycle is the same for the same input. The returned path starts and ends
/// at the task that closes the cycle.
fn find_cycle(graph: &DiGraphMap<TaskId, ()>) -> Option<Vec<TaskId>> {
    let mut colour: HashMap<TaskId, Colour> =
        graph.nodes().map(|id| (id, Colour::White)).collect();
    let mut starts: Vec<TaskId> = graph.nodes().collect();
    starts.sort_unstable();

    for start in starts {
        if colour.get(&start) == Some(&Colour::White) {
            if let Some(cycle) = visit(graph, start, &mut colour) {
                return Some(cycle);
            }
        }
    }
    None
}

/// Iterative DFS from `root`. Each frame holds a task and its remaining
/// successors, so the frames themselves are the current path.
fn visit(
    graph: &DiGraphMap<TaskId, ()>,
    root: TaskId,
    colour: &mut HashMap<TaskId, Colour>,
) -> Option<Vec<TaskId>> {
    let mut stack: Vec<(TaskId, std::vec::IntoIter<TaskId>)> = Vec::new();
    colour.insert(root, Colour::Grey);
    stack.push((root, sorted_neighbors(graph, root, Direction::Outgoing).into_iter()));

    while let Some((node, successors)) = stack.last_mut() {
        let node = *node;
        match successors.next() {
            Some(next) => match colour.get(&next).copied().unwrap_or(Colour::White) {
                Colour::Grey => {
                    let start = stack.iter().position(|(id, _)| *id == next).unwrap_or(0);
                    let mut cycle: Vec<TaskId> = stack[start..].iter().map(|(id, _)| *id).collect();
                    cycle.push(next);
                    return Some(cycle);
                }
                Colour::White => {
                    colour.insert(next, Colour::Grey);
                    let succ = sorted_neighbors(graph, next, Direction::Outgoing);
                    stack.push((next, succ.into_iter()));
                }
                Colour::Black => {}
            },
            None => {
                colour.insert(node, Colour::Black);
                stack.pop();
            }
        }
    }
    None
}

/// Kahn's algorithm over a min-heap: among the tasks whose predecessors are
/// all placed, the smallest id goes next.
fn stable_topological_order(graph: &DiGraphMap<TaskId, ()>) -> Vec<TaskId> {
    let mut in_degree: HashMap<TaskId, usize> = graph
        .nodes()
        .map(|id| (id, graph.neighbors_directed(id, Direction::Incoming).count()))
        .collect();

    let mut ready: BinaryHeap<Reverse<TaskId>> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&id, _)| Reverse(id))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for next in graph.neighbors_directed(id, Direction::Outgoing) {
            if let Some(deg) = in_degree.get_mut(&next) {
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
    }

    order
}

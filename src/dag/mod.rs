// src/dag/mod.rs

//! Task dependency graph and schedule analysis.
//!
//! - [`graph`] validates task records and builds an immutable DAG with a
//!   stable topological order.
//! - [`scheduler`] runs the CPM forward/backward passes over that DAG.
//! - [`critical`] reconstructs a critical chain from a computed schedule.

pub mod critical;
pub mod graph;
pub mod scheduler;

pub use critical::critical_path;
pub use graph::{Durations, TaskGraph, TaskRecord};
pub use scheduler::{compute_schedule, Schedule, ScheduleResult};

use crate::errors::Result;
use crate::types::Day;

/// Build the graph for `tasks` and schedule it with the durations the tasks
/// carry.
///
/// Any graph error aborts before scheduling; nothing partial is returned.
pub fn analyze(tasks: &[TaskRecord], project_start: Day) -> Result<(TaskGraph, Schedule)> {
    let graph = TaskGraph::build(tasks)?;
    let schedule = compute_schedule(&graph, graph.durations(), project_start)?;
    Ok((graph, schedule))
}

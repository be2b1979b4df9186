// src/store/mod.rs

//! Schedule persistence contract.
//!
//! The CPM core never talks to storage directly; [`recompute_project`] reads a
//! consistent snapshot through [`ScheduleStore`], computes, and replaces the
//! project's rows in one call. Nothing is written unless every step succeeds.

pub mod memory;
pub mod model;

pub use memory::MemoryScheduleStore;
pub use model::{schedule_rows, CriticalPathRow, Project, Task};

use tracing::{info, warn};

use crate::dag::{self, Schedule, TaskRecord};
use crate::errors::{CritpathError, Result};
use crate::types::ProjectId;

/// Abstract storage for projects, tasks and computed schedule rows.
pub trait ScheduleStore: Send + Sync {
    fn project(&self, id: ProjectId) -> Result<Option<Project>>;

    /// All tasks of a project, ascending by id.
    fn tasks(&self, project_id: ProjectId) -> Result<Vec<Task>>;

    /// Currently stored schedule rows of a project.
    fn schedule(&self, project_id: ProjectId) -> Result<Vec<CriticalPathRow>>;

    /// Drop every stored row of the project and store `rows` instead.
    fn replace_schedule(&mut self, project_id: ProjectId, rows: Vec<CriticalPathRow>) -> Result<()>;
}

/// Recompute and replace the schedule of one project.
///
/// Returns the computed schedule (day offsets from the project start date).
/// On any error the stored rows are left as they were.
pub fn recompute_project(store: &mut dyn ScheduleStore, project_id: ProjectId) -> Result<Schedule> {
    let project = store
        .project(project_id)?
        .ok_or(CritpathError::ProjectNotFound(project_id))?;

    let records: Vec<TaskRecord> = store
        .tasks(project_id)?
        .iter()
        .map(Task::to_record)
        .collect();

    let (_graph, schedule) = match dag::analyze(&records, 0) {
        Ok(result) => result,
        Err(e) => {
            warn!(project = project_id, error = %e, "schedule recompute aborted; keeping stored rows");
            return Err(e);
        }
    };

    let rows = schedule_rows(project_id, project.start_date, &schedule)?;
    let row_count = rows.len();
    store.replace_schedule(project_id, rows)?;

    info!(
        project = project_id,
        rows = row_count,
        duration_days = schedule.duration(),
        "stored recomputed schedule"
    );

    Ok(schedule)
}

// src/store/memory.rs

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::ProjectFile;
use crate::errors::Result;
use crate::store::model::{CriticalPathRow, Project, Task};
use crate::store::ScheduleStore;
use crate::types::{ProjectId, TaskId};

/// Keeps everything in ordered maps; lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryScheduleStore {
    projects: BTreeMap<ProjectId, Project>,
    /// Keyed by (project, task) so ids only need to be unique per project.
    tasks: BTreeMap<(ProjectId, TaskId), Task>,
    schedules: BTreeMap<ProjectId, Vec<CriticalPathRow>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the single project described by `file`.
    pub fn from_project_file(file: &ProjectFile) -> Self {
        let mut store = Self::new();
        let project = Project::from(&file.project);
        let project_id = project.id;
        store.insert_project(project);
        for cfg in file.task.iter() {
            store.insert_task(Task::from_config(project_id, cfg));
        }
        store
    }

    pub fn insert_project(&mut self, project: Project) {
        debug!(project = project.id, name = %project.name, "storing project");
        self.projects.insert(project.id, project);
    }

    /// Insert or overwrite a task.
    pub fn insert_task(&mut self, task: Task) {
        self.tasks.insert((task.project_id, task.id), task);
    }

    pub fn remove_task(&mut self, project_id: ProjectId, task_id: TaskId) -> Option<Task> {
        self.tasks.remove(&(project_id, task_id))
    }

    /// Remove a project with its tasks and schedule rows.
    pub fn delete_project(&mut self, project_id: ProjectId) -> Option<Project> {
        let project = self.projects.remove(&project_id)?;
        self.tasks.retain(|(pid, _), _| *pid != project_id);
        self.schedules.remove(&project_id);
        info!(project = project_id, "deleted project with its tasks and schedule");
        Some(project)
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn project(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.get(&id).cloned())
    }

    fn tasks(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .range((project_id, TaskId::MIN)..=(project_id, TaskId::MAX))
            .map(|(_, task)| task.clone())
            .collect())
    }

    fn schedule(&self, project_id: ProjectId) -> Result<Vec<CriticalPathRow>> {
        Ok(self.schedules.get(&project_id).cloned().unwrap_or_default())
    }

    fn replace_schedule(&mut self, project_id: ProjectId, rows: Vec<CriticalPathRow>) -> Result<()> {
        let previous = self
            .schedules
            .insert(project_id, rows)
            .map(|old| old.len())
            .unwrap_or(0);
        debug!(
            project = project_id,
            previous,
            current = self.schedules.get(&project_id).map(Vec::len).unwrap_or(0),
            "replaced schedule rows"
        );
        Ok(())
    }
}

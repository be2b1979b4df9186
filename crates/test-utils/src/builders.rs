#![allow(dead_code)]

use chrono::NaiveDate;
use critpath::config::{ProjectFile, ProjectSection, RawProjectFile, TaskConfig};
use critpath::dag::TaskRecord;
use critpath::types::{ProjectId, TaskId};

/// Calendar date shorthand for tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Task records `1 -> 2 -> ... -> n` with the given durations.
pub fn chain(durations: &[i64]) -> Vec<TaskRecord> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &duration)| {
            let id = i as TaskId + 1;
            let record = TaskRecord::new(id, duration);
            if id > 1 { record.after(id - 1) } else { record }
        })
        .collect()
}

/// Builder for `ProjectFile` to simplify test setup.
pub struct ProjectFileBuilder {
    raw: RawProjectFile,
}

impl ProjectFileBuilder {
    pub fn new(name: &str, start_date: NaiveDate) -> Self {
        Self {
            raw: RawProjectFile {
                project: ProjectSection {
                    id: 1,
                    name: name.to_string(),
                    description: None,
                    start_date,
                    end_date: None,
                    budget: None,
                    status: "active".to_string(),
                },
                task: Vec::new(),
            },
        }
    }

    pub fn with_id(mut self, id: ProjectId) -> Self {
        self.raw.project.id = id;
        self
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.raw.task.push(task);
        self
    }

    /// The unvalidated file, for tests that exercise validation.
    pub fn build_raw(self) -> RawProjectFile {
        self.raw
    }

    pub fn build(self) -> ProjectFile {
        ProjectFile::try_from(self.raw).expect("Failed to build valid project from builder")
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(id: TaskId, name: &str, duration: i64) -> Self {
        Self {
            task: TaskConfig {
                id,
                name: name.to_string(),
                description: None,
                duration,
                start_date: None,
                end_date: None,
                depends_on: None,
                completed: false,
            },
        }
    }

    pub fn depends_on(mut self, id: TaskId) -> Self {
        self.task.depends_on = Some(id);
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.task.description = Some(text.to_string());
        self
    }

    pub fn completed(mut self, val: bool) -> Self {
        self.task.completed = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::{ProjectId, TaskId};

#[derive(Error, Debug)]
pub enum CritpathError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A `depends_on` reference that does not resolve inside the project.
    #[error("Data integrity error: task {task} depends on unknown task {missing}")]
    DataIntegrityError { task: TaskId, missing: TaskId },

    #[error("Data integrity error: task id {0} appears more than once")]
    DuplicateTask(TaskId),

    #[error("Data integrity error: task {task} has non-positive duration {duration}")]
    InvalidDuration { task: TaskId, duration: i64 },

    /// Ids are listed in traversal order, starting and ending at the same task.
    #[error("Cyclic dependency between tasks {}", format_cycle(.cycle))]
    CyclicDependencyError { cycle: Vec<TaskId> },

    /// The scheduler was handed a graph that breaks its preconditions.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Collaboration relay is no longer running")]
    RelayClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CritpathError {
    /// True for the errors that mean the stored task data itself is unusable
    /// (as opposed to IO or internal failures).
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CritpathError::DataIntegrityError { .. }
                | CritpathError::DuplicateTask(_)
                | CritpathError::InvalidDuration { .. }
                | CritpathError::CyclicDependencyError { .. }
        )
    }
}

fn format_cycle(cycle: &[TaskId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CritpathError>;

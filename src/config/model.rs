// src/config/model.rs

use chrono::NaiveDate;
use serde::Deserialize;

use crate::dag::TaskRecord;
use crate::types::{ProjectId, TaskId};

/// A project file exactly as read from TOML, before validation.
///
/// ```toml
/// [project]
/// id = 7
/// name = "Website relaunch"
/// start_date = "2024-03-04"
///
/// [[task]]
/// id = 1
/// name = "Design"
/// duration = 2
///
/// [[task]]
/// id = 2
/// name = "Build"
/// duration = 3
/// depends_on = 1
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawProjectFile {
    pub project: ProjectSection,

    /// All tasks from `[[task]]`, in file order.
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// A validated project file.
///
/// Only constructible through `TryFrom<RawProjectFile>` (see
/// `config::validate`) or [`ProjectFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub project: ProjectSection,
    pub task: Vec<TaskConfig>,
}

impl ProjectFile {
    pub fn new_unchecked(project: ProjectSection, task: Vec<TaskConfig>) -> Self {
        Self { project, task }
    }

    /// Scheduling view of the tasks: id, duration and predecessors.
    pub fn task_records(&self) -> Vec<TaskRecord> {
        self.task.iter().map(TaskConfig::to_record).collect()
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_project_id")]
    pub id: ProjectId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Schedule origin: day 0 of every computed schedule.
    pub start_date: NaiveDate,

    /// Planned end date. Informational; the schedule derives its own finish.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub budget: Option<f64>,

    #[serde(default = "default_status")]
    pub status: String,
}

fn default_project_id() -> ProjectId {
    1
}

fn default_status() -> String {
    "active".to_string()
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub id: TaskId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Duration in whole days. Must be positive.
    pub duration: i64,

    /// Display-only dates; scheduling uses `duration` and `depends_on`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// The single predecessor this task waits for, if any.
    #[serde(default)]
    pub depends_on: Option<TaskId>,

    #[serde(default)]
    pub completed: bool,
}

impl TaskConfig {
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id,
            duration: self.duration,
            depends_on: self.depends_on.into_iter().collect(),
        }
    }
}

/// Relay server settings as read from TOML (`[relay]` section).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRelayFile {
    #[serde(default)]
    pub relay: RelaySection,
}

/// `[relay]` section.
///
/// ```toml
/// [relay]
/// bind = "0.0.0.0:5000"
/// send_timeout_ms = 2000
/// outbox_capacity = 64
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySection {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound for a single WebSocket send before the peer is dropped.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Events buffered per connection before further events to it are dropped.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_send_timeout_ms() -> u64 {
    5000
}

fn default_outbox_capacity() -> usize {
    64
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            send_timeout_ms: default_send_timeout_ms(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

/// Validated relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: std::net::SocketAddr,
    pub send_timeout: std::time::Duration,
    pub outbox_capacity: usize,
}

// src/store/model.rs

//! Stored records: projects, tasks and critical-path rows.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ProjectSection, TaskConfig};
use crate::dag::{Schedule, TaskRecord};
use crate::errors::{CritpathError, Result};
use crate::types::{Day, ProjectId, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub status: String,
}

impl From<&ProjectSection> for Project {
    fn from(section: &ProjectSection) -> Self {
        Self {
            id: section.id,
            name: section.name.clone(),
            description: section.description.clone(),
            start_date: section.start_date,
            end_date: section.end_date,
            budget: section.budget,
            status: section.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub duration: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub depends_on: Option<TaskId>,
    pub completed: bool,
}

impl Task {
    pub fn from_config(project_id: ProjectId, cfg: &TaskConfig) -> Self {
        Self {
            id: cfg.id,
            project_id,
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            duration: cfg.duration,
            start_date: cfg.start_date,
            end_date: cfg.end_date,
            depends_on: cfg.depends_on,
            completed: cfg.completed,
        }
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id,
            duration: self.duration,
            depends_on: self.depends_on.into_iter().collect(),
        }
    }
}

/// One stored schedule row: a task's CPM timing as calendar instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathRow {
    pub project_id: ProjectId,
    pub task_id: TaskId,
    pub earliest_start: DateTime<Utc>,
    pub earliest_finish: DateTime<Utc>,
    pub latest_start: DateTime<Utc>,
    pub latest_finish: DateTime<Utc>,
    /// Days.
    pub slack: i64,
}

impl CriticalPathRow {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

/// Convert a schedule into rows anchored at midnight UTC of `start_date`.
///
/// Offset `schedule.project_start()` maps to `start_date`; every other offset
/// is that many whole days later. No calendar exceptions are applied.
pub fn schedule_rows(
    project_id: ProjectId,
    start_date: NaiveDate,
    schedule: &Schedule,
) -> Result<Vec<CriticalPathRow>> {
    let origin = start_date.and_time(NaiveTime::MIN).and_utc();
    let base = schedule.project_start();

    schedule
        .iter()
        .map(|(task_id, r)| {
            Ok(CriticalPathRow {
                project_id,
                task_id,
                earliest_start: instant(origin, r.earliest_start - base)?,
                earliest_finish: instant(origin, r.earliest_finish - base)?,
                latest_start: instant(origin, r.latest_start - base)?,
                latest_finish: instant(origin, r.latest_finish - base)?,
                slack: r.slack,
            })
        })
        .collect()
}

fn instant(origin: DateTime<Utc>, days: Day) -> Result<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| origin.checked_add_signed(delta))
        .ok_or_else(|| {
            CritpathError::InvariantViolation(format!(
                "day offset {days} is outside the representable date range"
            ))
        })
}

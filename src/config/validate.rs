// src/config/validate.rs

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use crate::config::model::{ProjectFile, RawProjectFile, RawRelayFile, RelayConfig};
use crate::errors::{CritpathError, Result};

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = CritpathError;

    fn try_from(raw: RawProjectFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_project(&raw)?;
        Ok(ProjectFile::new_unchecked(raw.project, raw.task))
    }
}

impl TryFrom<RawRelayFile> for RelayConfig {
    type Error = CritpathError;

    fn try_from(raw: RawRelayFile) -> std::result::Result<Self, Self::Error> {
        let section = raw.relay;

        let bind: SocketAddr = section.bind.parse().map_err(|e| {
            CritpathError::ConfigError(format!(
                "[relay].bind '{}' is not a socket address: {e}",
                section.bind
            ))
        })?;

        if section.send_timeout_ms == 0 {
            return Err(CritpathError::ConfigError(
                "[relay].send_timeout_ms must be >= 1 (got 0)".to_string(),
            ));
        }

        if section.outbox_capacity == 0 {
            return Err(CritpathError::ConfigError(
                "[relay].outbox_capacity must be >= 1 (got 0)".to_string(),
            ));
        }

        Ok(RelayConfig {
            bind,
            send_timeout: Duration::from_millis(section.send_timeout_ms),
            outbox_capacity: section.outbox_capacity,
        })
    }
}

/// Field-level checks only. Dependency references and cycles are checked by
/// [`crate::dag::TaskGraph::build`], so a project file with a dangling
/// `depends_on` still loads and fails when it is scheduled.
fn validate_raw_project(raw: &RawProjectFile) -> Result<()> {
    validate_project_section(raw)?;
    validate_tasks(raw)?;
    Ok(())
}

fn validate_project_section(raw: &RawProjectFile) -> Result<()> {
    let project = &raw.project;

    if project.name.trim().is_empty() {
        return Err(CritpathError::ConfigError(
            "[project].name must not be empty".to_string(),
        ));
    }

    if let Some(end) = project.end_date {
        if end < project.start_date {
            return Err(CritpathError::ConfigError(format!(
                "[project].end_date {} is before start_date {}",
                end, project.start_date
            )));
        }
    }

    if let Some(budget) = project.budget {
        if budget < 0.0 {
            return Err(CritpathError::ConfigError(format!(
                "[project].budget must not be negative (got {budget})"
            )));
        }
    }

    Ok(())
}

fn validate_tasks(raw: &RawProjectFile) -> Result<()> {
    let mut seen = HashSet::new();

    for task in raw.task.iter() {
        if !seen.insert(task.id) {
            return Err(CritpathError::DuplicateTask(task.id));
        }

        if task.name.trim().is_empty() {
            return Err(CritpathError::ConfigError(format!(
                "task {} must have a non-empty name",
                task.id
            )));
        }

        if task.duration <= 0 {
            return Err(CritpathError::ConfigError(format!(
                "task {} ('{}') must have a positive duration (got {})",
                task.id, task.name, task.duration
            )));
        }

        if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
            if end < start {
                // Display-only dates; scheduling does not read them.
                warn!(
                    task = task.id,
                    %start,
                    %end,
                    "task end_date precedes start_date"
                );
            }
        }
    }

    Ok(())
}

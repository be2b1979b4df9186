use std::fmt;
use std::str::FromStr;

/// Task identity, unique within a project.
pub type TaskId = i64;

/// Project identity.
pub type ProjectId = i64;

/// User identity as reported by the transport (e.g. `?userId=` on connect).
pub type UserId = i64;

/// Whole days relative to the schedule origin.
pub type Day = i64;

/// Relay-assigned identifier for a live client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// How `critpath schedule` prints its result.
///
/// - `Table`: one human-readable line per task (default).
/// - `Json`: the dated critical-path rows, ready to be stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "invalid output format: {other} (expected \"table\" or \"json\")"
            )),
        }
    }
}

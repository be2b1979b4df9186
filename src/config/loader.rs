// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ProjectFile, RawProjectFile, RawRelayFile, RelayConfig};
use crate::errors::Result;

/// Load a project file from a given path and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let project: RawProjectFile = toml::from_str(&contents)?;

    Ok(project)
}

/// Load a project file from path and run field validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks for duplicate task ids, empty names and non-positive durations.
///
/// Dependency structure (dangling references, cycles) is left to the graph
/// builder so that the same checks run for files and for stored tasks.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(&path)?;
    let project = ProjectFile::try_from(raw)?;
    Ok(project)
}

/// Load relay settings. A missing path yields the defaults.
pub fn load_relay_config(path: Option<&Path>) -> Result<RelayConfig> {
    let raw = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<RawRelayFile>(&contents)?
        }
        None => RawRelayFile::default(),
    };
    RelayConfig::try_from(raw)
}

/// Default project file looked up by `critpath schedule`.
pub fn default_project_path() -> PathBuf {
    PathBuf::from("Project.toml")
}

// src/config/mod.rs

//! Configuration loading and validation for critpath.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load project and relay files from disk (`loader.rs`).
//! - Validate field-level invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_project_path, load_and_validate, load_from_path, load_relay_config};
pub use model::{
    ProjectFile, ProjectSection, RawProjectFile, RawRelayFile, RelayConfig, RelaySection,
    TaskConfig,
};

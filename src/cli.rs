// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::OutputFormat;

/// Command-line arguments for `critpath`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "critpath",
    version,
    about = "Critical-path scheduling and live collaboration for project plans.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CRITPATH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compute the critical path of a project file and print the schedule.
    Schedule {
        /// Path to the project file (TOML).
        #[arg(long, value_name = "PATH", default_value = "Project.toml")]
        project: String,

        /// Output format: `table` or `json`.
        #[arg(long, value_name = "FORMAT", default_value = "table")]
        format: OutputFormat,

        /// Only print zero-slack tasks.
        #[arg(long)]
        critical_only: bool,
    },

    /// Run the collaboration relay (WebSocket on /ws/collaboration).
    Serve {
        /// Relay settings file (TOML with a `[relay]` section).
        #[arg(long, value_name = "PATH")]
        config: Option<String>,

        /// Listen address; overrides `[relay].bind`.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cutdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cutdag",
    version,
    about = "Schedule an analysis pipeline and print the execution tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline file (TOML).
    ///
    /// Default: `Pipeline.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pipeline.toml")]
    pub config: String,

    /// Extra pre-existing input names, in addition to the file's `inputs`.
    #[arg(long = "input", value_name = "NAME")]
    pub inputs: Vec<String>,

    /// Also list the variables the schedule ends up using.
    #[arg(long)]
    pub used_variables: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CUTDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chartbump - semantic versioning for Helm charts
///
/// Bumps the versions of charts touched by a change set according to the
/// conventional-commit message that describes it.
#[derive(Parser, Debug)]
#[command(name = "chartbump")]
#[command(author = "Eshan Roy")]
#[command(version)]
#[command(about = "Conventional-commit driven Helm chart versioning", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to run (defaults to run if not specified)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Repository root; changed paths are resolved against it
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for machine-readable output
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Output format for CI and scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text output (default)
    Text,
    /// JSON output for machine parsing
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Version, package and publish the charts changed by a CI event (default)
    Run(RunArgs),

    /// Compute new versions for a list of changed files
    Resolve(ResolveArgs),

    /// Classify a conventional commit message
    Classify(ClassifyArgs),

    /// List the charts under the charts root
    Charts(ChartsArgs),

    /// Print version information
    Version,

    /// Initialize chartbump configuration
    Init(InitArgs),
}

/// Arguments for the run command.
#[derive(Parser, Debug, Default, Clone)]
pub struct RunArgs {
    /// Local mode: ignore labels and do not commit or push
    #[arg(long)]
    pub local: bool,

    /// Resolve versions only; write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Event payload file (defaults to $GITHUB_EVENT_PATH)
    #[arg(long, value_name = "PATH")]
    pub event: Option<PathBuf>,
}

/// Arguments for the resolve command.
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Commit message or pull request title
    #[arg(short, long)]
    pub message: String,

    /// Message to use when the first is not a conventional commit
    #[arg(long)]
    pub fallback: Option<String>,

    /// Changed files, relative to the repository root
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,
}

/// Arguments for the classify command.
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// The message to classify
    pub message: String,
}

/// Arguments for the charts command.
#[derive(Parser, Debug, Default, Clone)]
pub struct ChartsArgs {
    /// Chart names to leave out (in addition to configured exclusions)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,
}

/// Arguments for the init command.
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl Cli {
    /// Get the effective command, defaulting to Run if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run(RunArgs::default()))
    }

    pub fn is_json(&self) -> bool {
        self.format == Some(OutputFormat::Json)
    }
}

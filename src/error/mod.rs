// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for chartbump.
//!
//! Every concern gets its own error enum; [`ChartbumpError`] wraps them so
//! callers can propagate with `?` and still match on the failing concern.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for chartbump operations.
#[derive(Error, Debug)]
pub enum ChartbumpError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Commit message errors
    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    // Chart metadata errors
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    // Packaging errors
    #[error("Helm error: {0}")]
    Helm(#[from] HelmError),

    // Git errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    // GitHub errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl ChartbumpError {
    /// Whether this is a commit message that failed conventional parsing.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChartbumpError::Commit(CommitError::InvalidFormat { .. }))
    }
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Commit message errors.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Invalid conventional commit message: {header:?}")]
    InvalidFormat { header: String },
}

/// Chart metadata errors.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to read chart metadata {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("Failed to write chart metadata {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },
}

/// Errors from the external packaging tool.
#[derive(Error, Debug)]
pub enum HelmError {
    #[error("Failed to launch '{command}': {message}")]
    SpawnFailed { command: String, message: String },

    #[error("Command '{command}' exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },
}

/// Git-related errors.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Failed to open repository: {message}")]
    OpenFailed { message: String },

    #[error("No staged changes found")]
    NoStagedChanges,

    #[error("Failed to create commit: {message}")]
    CommitFailed { message: String },

    #[error("Git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::OpenFailed {
            message: err.message().to_string(),
        }
    }
}

/// GitHub API and CI context errors.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to read event payload {path}: {message}")]
    EventPayload { path: PathBuf, message: String },

    #[error("Request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}

/// Result type alias for chartbump operations.
pub type Result<T> = std::result::Result<T, ChartbumpError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ChartbumpError::WithContext {
            context: context.into(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config"),
        };
        assert!(err.to_string().contains("/path/to/config"));
    }

    #[test]
    fn test_invalid_format_display() {
        let err: ChartbumpError = CommitError::InvalidFormat {
            header: "some random commit".to_string(),
        }
        .into();
        assert!(err.is_invalid_format());
        assert!(err
            .to_string()
            .contains("Invalid conventional commit message"));
    }

    #[test]
    fn test_helm_error_display() {
        let err = HelmError::CommandFailed {
            command: "helm package charts/top1".to_string(),
            status: 1,
            stderr: "no Chart.yaml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("helm package charts/top1"));
        assert!(msg.contains("no Chart.yaml"));
    }

    #[test]
    fn test_io_error_converts() {
        fn write() -> Result<()> {
            std::fs::write("/definitely/not/here/chartbump.toml", "")?;
            Ok(())
        }
        assert!(matches!(write(), Err(ChartbumpError::Io(_))));
    }

    #[test]
    fn test_context_wraps_source_message() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = io.context("reading event").unwrap_err();
        assert_eq!(err.to_string(), "reading event: gone");
        assert!(!err.is_invalid_format());
    }
}

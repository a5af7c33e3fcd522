// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Outcome of a pipeline run.

use crate::bump::VersionResult;
use serde::Serialize;
use std::path::PathBuf;

/// Options controlling a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Honour the manual-versioning label and commit/push results.
    pub pull_request_mode: bool,
    /// Resolve versions only; touch nothing.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            pull_request_mode: true,
            dry_run: false,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Set when the run stopped before resolving anything.
    pub skipped: Option<String>,
    /// Number of changed files considered after filtering.
    pub changed_files: usize,
    pub versions: VersionResult,
    pub dry_run: bool,
    pub updated_files: Vec<PathBuf>,
    pub packaged: Vec<String>,
    pub index_regenerated: bool,
    pub commit: Option<String>,
    pub pushed_to: Option<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    /// Record and log a non-fatal problem.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub(crate) fn skip(mut self, reason: &str) -> Self {
        tracing::info!("{}", reason);
        self.skipped = Some(reason.to_string());
        self
    }

    pub fn pushed(&self) -> bool {
        self.pushed_to.is_some()
    }
}

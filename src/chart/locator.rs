// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Nearest-ancestor chart lookup for changed files.

use std::path::{Path, PathBuf};

use super::metadata::ChartMetadata;
use super::DEFAULT_METADATA_FILE;

/// A chart that owns at least one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRef {
    /// Declared chart name.
    pub name: String,
    /// Location of the metadata file the name was read from.
    pub metadata_path: PathBuf,
}

impl ChartRef {
    /// Read the chart's current version from disk.
    ///
    /// The file is re-read on every call; `None` when it is unreadable or
    /// has no non-empty `version` field.
    pub fn current_version(&self) -> Option<String> {
        match ChartMetadata::read(&self.metadata_path) {
            Ok(meta) => meta.version,
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }

    /// Directory containing the chart.
    pub fn chart_dir(&self) -> Option<&Path> {
        self.metadata_path.parent()
    }
}

/// Resolves changed paths to the chart that owns them.
#[derive(Debug, Clone)]
pub struct ChartLocator {
    root: PathBuf,
    metadata_file: String,
}

impl ChartLocator {
    /// Create a locator for paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
        }
    }

    /// Use a different metadata file name.
    pub fn with_metadata_file(mut self, metadata_file: impl Into<String>) -> Self {
        self.metadata_file = metadata_file.into();
        self
    }

    /// The repository root paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the chart owning `changed_path`.
    ///
    /// The deepest ancestor directory holding a metadata file wins. Returns
    /// `None` when no ancestor has one, or when the nearest one has no name.
    pub fn locate(&self, changed_path: &str) -> Option<ChartRef> {
        let metadata_path = self.find_metadata(changed_path)?;
        let name = match ChartMetadata::read(&metadata_path) {
            Ok(meta) => meta.name?,
            Err(e) => {
                tracing::debug!("{}", e);
                return None;
            }
        };

        Some(ChartRef {
            name,
            metadata_path,
        })
    }

    /// Path of the nearest metadata file above `changed_path`, if any.
    pub fn find_metadata(&self, changed_path: &str) -> Option<PathBuf> {
        candidate_dirs(changed_path)
            .into_iter()
            .map(|dir| self.root.join(dir).join(&self.metadata_file))
            .find(|candidate| candidate.is_file())
    }
}

/// Ancestor directories of a repository-relative path, deepest first.
///
/// The repository root itself is never a candidate. Paths escaping the
/// root through `..` yield no candidates.
pub fn candidate_dirs(changed_path: &str) -> Vec<String> {
    let normalized = changed_path.replace('\\', "/");
    let segments: Vec<&str> = normalized
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.iter().any(|s| *s == "..") {
        return Vec::new();
    }

    // Drop the file name; only its directory chain is searched.
    let dirs = match segments.split_last() {
        Some((_, dirs)) => dirs,
        None => return Vec::new(),
    };

    (1..=dirs.len())
        .rev()
        .map(|depth| dirs[..depth].join("/"))
        .collect()
}

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Changed-file records supplied by the VCS side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change made to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[serde(alias = "copied")]
    Added,
    #[serde(alias = "changed", alias = "unchanged")]
    Modified,
    Removed,
    Renamed,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Removed => "removed",
            ChangeType::Renamed => "renamed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A repository-relative path and how it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    #[serde(rename = "changeType")]
    pub change_type: ChangeType,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            path: path.into(),
            change_type,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Self::new(path, ChangeType::Modified)
    }
}

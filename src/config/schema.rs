// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration schema definitions.
//!
//! Defines all configuration structures that can be loaded from chartbump.toml.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The main configuration structure for chartbump.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChartbumpConfig {
    /// Chart discovery and metadata settings.
    pub charts: ChartsConfig,

    /// Version resolution settings.
    pub versioning: VersioningConfig,

    /// Packaging settings.
    pub helm: HelmConfig,

    /// Commit and push settings.
    pub publish: PublishConfig,

    /// GitHub settings.
    pub github: GitHubConfig,
}

impl ChartbumpConfig {
    /// Load the nearest configuration above `start_dir`, else the defaults.
    pub fn load(start_dir: &std::path::Path) -> crate::error::Result<Self> {
        super::loader::load_config(start_dir)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &std::path::Path) -> crate::error::Result<Self> {
        super::loader::load_config_from(path)
    }
}

/// Chart discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Directory holding the charts, relative to the repository root.
    pub root: PathBuf,

    /// Name of the chart metadata file.
    pub metadata_file: String,

    /// Chart names never versioned, packaged or listed.
    pub exclude: Vec<String>,

    /// Glob patterns of changed paths to ignore.
    pub exclude_paths: Vec<String>,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("charts"),
            metadata_file: "Chart.yaml".to_string(),
            exclude: Vec::new(),
            exclude_paths: Vec::new(),
        }
    }
}

/// Version resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Message used when no commit message is found in the CI context.
    pub default_message: String,

    /// Message used when the detected message is not a conventional commit.
    pub fallback_message: String,

    /// PR label that disables automatic versioning.
    pub manual_label: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            default_message: "chore: bump charts".to_string(),
            fallback_message: "chore: bump".to_string(),
            manual_label: "manual-versioning".to_string(),
        }
    }
}

/// Packaging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// Packaging binary.
    pub binary: String,

    /// Directory receiving packaged charts and the index.
    pub output_dir: PathBuf,

    /// Public URL of the chart repository, written into the index.
    pub repo_url: String,

    /// Whether to run a dependency update before packaging.
    pub dependency_update: bool,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_string(),
            output_dir: PathBuf::from("docs/interledger"),
            repo_url: "https://interledger.org/charts/".to_string(),
            dependency_update: true,
        }
    }
}

/// Commit and push configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Remote to push to.
    pub remote: String,

    /// Committer name.
    pub user_name: String,

    /// Committer email.
    pub user_email: String,

    /// Handlebars template for the commit message.
    pub message_template: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            user_name: "github-actions[bot]".to_string(),
            user_email: "github-actions[bot]@users.noreply.github.com".to_string(),
            message_template: "chore(version): bump charts {{charts}}".to_string(),
        }
    }
}

/// GitHub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL.
    pub api_url: String,

    /// Page size used when listing pull request files.
    pub per_page: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            per_page: 100,
        }
    }
}

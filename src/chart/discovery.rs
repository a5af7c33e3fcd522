// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Chart discovery under a charts directory.

use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use super::metadata::ChartMetadata;

/// A chart found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartInfo {
    /// Declared chart name.
    pub name: String,
    /// Declared version, if any.
    pub version: Option<String>,
    /// Metadata file path relative to the discovery root, `/`-separated.
    pub path: String,
    /// Declared app version, or `v{version}` when absent.
    #[serde(rename = "appVersion")]
    pub app_version: Option<String>,
}

impl ChartInfo {
    /// Directory of the chart relative to the discovery root.
    pub fn chart_dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

/// Find every chart under `root`, skipping names listed in `exclusions`.
///
/// Results are ordered by directory depth (shallow first), then by name.
/// A missing root yields no charts.
pub fn find_all_charts(root: &Path, metadata_file: &str, exclusions: &[String]) -> Vec<ChartInfo> {
    if !root.is_dir() {
        tracing::debug!("Chart root {:?} does not exist", root);
        return Vec::new();
    }

    let mut charts = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == metadata_file)
    {
        let meta = match ChartMetadata::read(entry.path()) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        let name = match meta.name {
            Some(name) => name,
            None => continue,
        };
        if exclusions.contains(&name) {
            tracing::debug!("Excluding chart {}", name);
            continue;
        }

        let path = match entry.path().strip_prefix(root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => continue,
        };

        let app_version = meta
            .app_version
            .or_else(|| meta.version.as_ref().map(|v| format!("v{}", v)));

        charts.push(ChartInfo {
            name,
            version: meta.version,
            path,
            app_version,
        });
    }

    charts.sort_by(|a, b| {
        a.depth()
            .cmp(&b.depth())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.path.cmp(&b.path))
    });

    charts
}

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! In-place version patching of chart metadata.

use crate::error::{ChartError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

use super::discovery::find_all_charts;

lazy_static! {
    static ref VERSION_LINE_REGEX: Regex =
        Regex::new(r"(?m)^(?P<indent>[ \t]*)version:[ \t]*[^\r\n#]*(?P<comment>#[^\r\n]*)?")
            .unwrap();
    static ref APP_VERSION_LINE_REGEX: Regex = Regex::new(r"(?m)^[ \t]*appVersion:").unwrap();
}

/// Set `version` to `new_version` and make sure an `appVersion` exists.
///
/// The first top-level `version:` line is rewritten, or the first indented
/// one when there is no top-level key; its indentation and trailing comment
/// are kept. Without any `version:` line one is appended. An existing
/// `appVersion` is never touched; a missing one is inserted right after the
/// version line as `v{new_version}`.
pub fn update_chart_version(content: &str, new_version: &str) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

    let target = VERSION_LINE_REGEX
        .captures_iter(content)
        .find(|c| c["indent"].is_empty())
        .or_else(|| VERSION_LINE_REGEX.captures(content));

    let (mut updated, line_end, indent) = match target {
        Some(captures) => {
            let whole = captures.get(0).map(|m| m.range()).unwrap_or(0..0);
            let indent = captures["indent"].to_string();
            let mut line = format!("{}version: {}", indent, new_version);
            if let Some(comment) = captures.name("comment") {
                line.push(' ');
                line.push_str(comment.as_str());
            }

            let mut updated = String::with_capacity(content.len() + 16);
            updated.push_str(&content[..whole.start]);
            updated.push_str(&line);
            let line_end = updated.len();
            updated.push_str(&content[whole.end..]);
            (updated, line_end, indent)
        }
        None => {
            let mut updated = content.to_string();
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push_str(newline);
            }
            updated.push_str("version: ");
            updated.push_str(new_version);
            let line_end = updated.len();
            updated.push_str(newline);
            (updated, line_end, String::new())
        }
    };

    if !APP_VERSION_LINE_REGEX.is_match(&updated) {
        let app_line = format!("{}{}appVersion: v{}", newline, indent, new_version);
        updated.insert_str(line_end, &app_line);
    }

    updated
}

/// Rewrite the metadata of every chart under `root` whose name is listed.
///
/// Unreadable files are skipped; files are only written when their content
/// changes. Returns the paths that were written.
pub fn update_chart_version_files(
    root: &Path,
    metadata_file: &str,
    chart_names: &[String],
    new_version: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for chart in find_all_charts(root, metadata_file, &[]) {
        if !chart_names.contains(&chart.name) {
            continue;
        }

        let chart_file = root.join(&chart.path);
        let content = match std::fs::read_to_string(&chart_file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable {:?}: {}", chart_file, e);
                continue;
            }
        };

        let updated = update_chart_version(&content, new_version);
        if updated != content {
            std::fs::write(&chart_file, updated).map_err(|e| ChartError::WriteFailed {
                path: chart_file.clone(),
                message: e.to_string(),
            })?;
            tracing::debug!("Set {} to {} in {:?}", chart.name, new_version, chart_file);
            written.push(chart_file);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::discovery::find_all_charts;
    use crate::chart::fixtures;

    #[test]
    fn test_updates_version_and_keeps_app_version() {
        let content = "\nname: mychart\nversion: 1.2.3\nappVersion: v1.0.0\ndescription: A sample chart\n";
        let updated = update_chart_version(content, "2.0.0");
        assert_eq!(
            updated.trim(),
            "name: mychart\nversion: 2.0.0\nappVersion: v1.0.0\ndescription: A sample chart"
        );
    }

    #[test]
    fn test_inserts_missing_app_version() {
        let updated = update_chart_version("name: web\nversion: 0.1.0\ntype: application\n", "0.2.0");
        assert_eq!(
            updated,
            "name: web\nversion: 0.2.0\nappVersion: v0.2.0\ntype: application\n"
        );
    }

    #[test]
    fn test_appends_missing_version() {
        let updated = update_chart_version("name: web", "1.0.0");
        assert_eq!(updated, "name: web\nversion: 1.0.0\nappVersion: v1.0.0\n");
    }

    #[test]
    fn test_keeps_trailing_comment() {
        let updated = update_chart_version(
            "name: web\nversion: 0.1.0 # bumped by CI\nappVersion: \"1.4\"\n",
            "0.1.1",
        );
        assert_eq!(
            updated,
            "name: web\nversion: 0.1.1 # bumped by CI\nappVersion: \"1.4\"\n"
        );
    }

    #[test]
    fn test_prefers_top_level_version_over_dependency() {
        let content = "name: web\ndependencies:\n  - name: redis\n    version: 17.0.0\nversion: 1.0.0\nappVersion: v1\n";
        let updated = update_chart_version(content, "1.1.0");
        assert!(updated.contains("    version: 17.0.0\n"));
        assert!(updated.contains("\nversion: 1.1.0\n"));
    }

    #[test]
    fn test_preserves_indentation_when_only_indented() {
        let updated = update_chart_version("chart:\n  version: 1.0.0\n", "1.0.1");
        assert_eq!(updated, "chart:\n  version: 1.0.1\n  appVersion: v1.0.1\n");
    }

    #[test]
    fn test_crlf_content() {
        let updated = update_chart_version("name: web\r\nversion: 1.0.0\r\n", "2.0.0");
        assert_eq!(updated, "name: web\r\nversion: 2.0.0\r\nappVersion: v2.0.0\r\n");
    }

    #[test]
    fn test_update_files_for_selected_charts() {
        let dir = fixtures::good_charts();
        let root = dir.path().join("good-charts");
        let names = vec!["top1".to_string(), "nested1".to_string()];

        let written = update_chart_version_files(&root, "Chart.yaml", &names, "9.9.9").unwrap();
        assert_eq!(written.len(), 2);

        for chart in find_all_charts(&root, "Chart.yaml", &[]) {
            match chart.name.as_str() {
                "top1" => {
                    assert_eq!(chart.version.as_deref(), Some("9.9.9"));
                    assert_eq!(chart.app_version.as_deref(), Some("v2.4.4"));
                }
                "nested1" => {
                    assert_eq!(chart.version.as_deref(), Some("9.9.9"));
                    assert_eq!(chart.app_version.as_deref(), Some("v4.5.6"));
                }
                "top2" => assert_eq!(chart.version.as_deref(), Some("3.2.3")),
                "nested2" => assert_eq!(chart.version.as_deref(), Some("1.2.3")),
                other => panic!("unexpected chart {}", other),
            }
        }
    }

    #[test]
    fn test_update_files_is_noop_for_same_version() {
        let dir = fixtures::good_charts();
        let root = dir.path().join("good-charts");
        let written =
            update_chart_version_files(&root, "Chart.yaml", &["top2".to_string()], "3.2.3").unwrap();
        assert!(written.is_empty());
    }
}

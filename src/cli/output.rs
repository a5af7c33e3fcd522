// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Text and JSON rendering of command results.

use console::style;
use serde::Serialize;

use crate::bump::{BumpLevel, VersionResult};
use crate::chart::ChartInfo;
use crate::commit::ConventionalCommit;
use crate::pipeline::RunReport;

use super::args::OutputFormat;

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Print a version map.
pub fn print_versions(versions: &VersionResult, format: Option<OutputFormat>) {
    if format == Some(OutputFormat::Json) {
        return print_json(versions);
    }

    if versions.is_empty() {
        println!("{}", style("No chart versions to update").dim());
        return;
    }
    for (name, version) in versions {
        println!("{} {}", style(name).cyan(), version);
    }
}

/// Print a commit classification with the bump it implies.
pub fn print_classification(commit: &ConventionalCommit, format: Option<OutputFormat>) {
    let level = BumpLevel::from_commit(commit);

    if format == Some(OutputFormat::Json) {
        return print_json(&serde_json::json!({
            "type": commit.commit_type,
            "scope": commit.scope,
            "isBreaking": commit.is_breaking,
            "description": commit.description,
            "bump": level,
        }));
    }

    println!("{} {}", style("type:").dim(), commit.commit_type);
    if let Some(ref scope) = commit.scope {
        println!("{} {}", style("scope:").dim(), scope);
    }
    println!("{} {}", style("breaking:").dim(), commit.is_breaking);
    println!("{} {}", style("description:").dim(), commit.description);
    println!("{} {}", style("bump:").dim(), style(level).green().bold());
}

/// Print discovered charts.
pub fn print_charts(charts: &[ChartInfo], format: Option<OutputFormat>) {
    if format == Some(OutputFormat::Json) {
        return print_json(charts);
    }

    for chart in charts {
        println!(
            "{} {} {}",
            style(&chart.name).cyan(),
            chart.version.as_deref().unwrap_or("-"),
            style(&chart.path).dim()
        );
    }
}

/// Print a pipeline report.
pub fn print_report(report: &RunReport, format: Option<OutputFormat>) {
    if format == Some(OutputFormat::Json) {
        return print_json(report);
    }

    if let Some(ref reason) = report.skipped {
        println!("{}", style(reason).dim());
        return;
    }

    for (name, version) in &report.versions {
        let mark = if report.packaged.contains(name) {
            style("✓").green().bold()
        } else if report.dry_run {
            style("•").dim()
        } else {
            style("⚠").yellow().bold()
        };
        println!("{} {} -> {}", mark, style(name).cyan(), version);
    }

    if report.index_regenerated {
        println!("{} Regenerated Helm index", style("✓").green().bold());
    }
    if let Some(ref branch) = report.pushed_to {
        println!("{} Pushed to {}", style("✓").green().bold(), branch);
    }
    for warning in &report.warnings {
        println!("{} {}", style("⚠").yellow().bold(), warning);
    }
}

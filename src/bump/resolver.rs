// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Per-chart version resolution.

use crate::chart::{ChartLocator, ChartRef};
use crate::commit::classify;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::change::ChangedFile;
use super::level::{bump_version, BumpLevel};

/// New version per chart name.
pub type VersionResult = BTreeMap<String, String>;

/// Why a change or chart was left out of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// The changed path has no owning chart.
    NoChart { path: String },
    /// The owning chart's current version could not be read.
    UnreadableVersion { chart: String, metadata_path: PathBuf },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NoChart { path } => write!(f, "no chart owns {}", path),
            Skip::UnreadableVersion {
                chart,
                metadata_path,
            } => write!(
                f,
                "cannot read current version of {} from {}",
                chart,
                metadata_path.display()
            ),
        }
    }
}

/// Receives every omission made while resolving.
pub trait SkipSink {
    fn skipped(&mut self, skip: &Skip);
}

impl<F: FnMut(&Skip)> SkipSink for F {
    fn skipped(&mut self, skip: &Skip) {
        self(skip)
    }
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SkipSink for LogSink {
    fn skipped(&mut self, skip: &Skip) {
        match skip {
            Skip::NoChart { .. } => tracing::debug!("Skipping: {}", skip),
            Skip::UnreadableVersion { .. } => tracing::warn!("Skipping: {}", skip),
        }
    }
}

#[derive(Debug, Clone)]
struct PlannedBump {
    chart: ChartRef,
    level: BumpLevel,
}

/// Highest bump level seen per chart.
#[derive(Debug, Clone, Default)]
pub struct BumpPlan {
    entries: BTreeMap<String, PlannedBump>,
}

impl BumpPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bump for a chart. The level only ever goes up; the first
    /// reference recorded for a name is kept as its metadata handle.
    pub fn record(&mut self, chart: ChartRef, level: BumpLevel) {
        self.entries
            .entry(chart.name.clone())
            .and_modify(|planned| planned.level = planned.level.max(level))
            .or_insert(PlannedBump { chart, level });
    }

    /// Fold another plan into this one.
    pub fn merge(&mut self, other: BumpPlan) {
        for (_, planned) in other.entries {
            self.record(planned.chart, planned.level);
        }
    }

    pub fn level_of(&self, name: &str) -> Option<BumpLevel> {
        self.entries.get(name).map(|p| p.level)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read each chart's current version and bump it.
    pub fn into_versions(self, sink: &mut dyn SkipSink) -> VersionResult {
        let mut result = VersionResult::new();

        for (name, planned) in self.entries {
            match planned.chart.current_version() {
                Some(current) => {
                    let next = bump_version(&current, planned.level);
                    tracing::debug!("{}: {} -> {} ({})", name, current, next, planned.level);
                    result.insert(name, next);
                }
                None => sink.skipped(&Skip::UnreadableVersion {
                    chart: name,
                    metadata_path: planned.chart.metadata_path,
                }),
            }
        }

        result
    }
}

/// Turns changed files and a commit message into new chart versions.
#[derive(Debug, Clone)]
pub struct BumpResolver {
    locator: ChartLocator,
}

impl BumpResolver {
    pub fn new(locator: ChartLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &ChartLocator {
        &self.locator
    }

    /// Resolve new versions, logging omissions.
    ///
    /// Fails only when `commit_message` is not a conventional commit.
    pub fn resolve(&self, changes: &[ChangedFile], commit_message: &str) -> Result<VersionResult> {
        self.resolve_with_sink(changes, commit_message, &mut LogSink)
    }

    /// Resolve new versions, reporting omissions to `sink`.
    pub fn resolve_with_sink(
        &self,
        changes: &[ChangedFile],
        commit_message: &str,
        sink: &mut dyn SkipSink,
    ) -> Result<VersionResult> {
        let commit = classify(commit_message)?;
        let level = BumpLevel::from_commit(&commit);
        tracing::debug!("Classified {:?} as {} bump", commit.to_string(), level);

        Ok(self.plan(changes, level, sink).into_versions(sink))
    }

    /// Classify every message and keep the highest level per chart.
    pub fn resolve_messages(
        &self,
        changes: &[ChangedFile],
        messages: &[&str],
        sink: &mut dyn SkipSink,
    ) -> Result<VersionResult> {
        let mut plan = BumpPlan::new();
        let mut levels = Vec::with_capacity(messages.len());
        for message in messages {
            levels.push(BumpLevel::from_commit(&classify(message)?));
        }

        let mut first = true;
        for level in levels {
            // Omissions are reported once, not once per message.
            let partial = if first {
                self.plan(changes, level, sink)
            } else {
                self.plan(changes, level, &mut |_: &Skip| {})
            };
            first = false;
            plan.merge(partial);
        }

        Ok(plan.into_versions(sink))
    }

    /// Attribute each change to its chart at `level`.
    pub fn plan(&self, changes: &[ChangedFile], level: BumpLevel, sink: &mut dyn SkipSink) -> BumpPlan {
        let mut plan = BumpPlan::new();

        for change in changes {
            match self.locator.locate(&change.path) {
                Some(chart) => plan.record(chart, level),
                None => sink.skipped(&Skip::NoChart {
                    path: change.path.clone(),
                }),
            }
        }

        plan
    }
}

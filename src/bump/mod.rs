// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Version resolution: which charts move, and to what version.
//!
//! A single commit message is classified once and its bump level is applied
//! to every chart owning at least one changed file. Levels are combined with
//! a max-reduce per chart, so merging plans never downgrades a chart.

mod change;
mod level;
mod resolver;

pub use change::{ChangeType, ChangedFile};
pub use level::{bump_version, BumpLevel, ChartVersion};
pub use resolver::{BumpPlan, BumpResolver, LogSink, Skip, SkipSink, VersionResult};

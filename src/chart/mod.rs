// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Chart discovery, ownership lookup, and metadata editing.

mod discovery;
mod locator;
mod metadata;
mod writer;

pub use discovery::{find_all_charts, ChartInfo};
pub use locator::{candidate_dirs, ChartLocator, ChartRef};
pub use metadata::{strip_quotes, ChartMetadata};
pub use writer::{update_chart_version, update_chart_version_files};

/// Metadata file name used when none is configured.
pub const DEFAULT_METADATA_FILE: &str = "Chart.yaml";

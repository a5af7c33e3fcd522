// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! chartbump - conventional-commit driven Helm chart versioning
//!
//! Given the files changed by a pull request or push and the commit message
//! describing it, chartbump works out which charts are affected and bumps
//! each one's semantic version: breaking changes bump major, features bump
//! minor, everything else bumps patch.
//!
//! # Features
//!
//! - **Commit Classifier**: Conventional-commit header and footer parsing
//! - **Chart Locator**: Deepest enclosing chart for any changed path
//! - **Bump Resolver**: Max-reduced bump level per chart
//! - **CI Pipeline**: Metadata rewrite, packaging, index and push-back
//!
//! # Example
//!
//! ```no_run
//! use chartbump::bump::{BumpResolver, ChangedFile};
//! use chartbump::chart::ChartLocator;
//!
//! let resolver = BumpResolver::new(ChartLocator::new("."));
//! let changes = vec![ChangedFile::modified("charts/web/values.yaml")];
//!
//! let versions = resolver.resolve(&changes, "feat(web): add ingress").unwrap();
//! for (chart, version) in &versions {
//!     println!("{} -> {}", chart, version);
//! }
//! ```

// Module declarations
pub mod bump;
pub mod chart;
pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod helm;
pub mod pipeline;

// Re-exports for convenience
pub use bump::{BumpLevel, BumpResolver, ChangedFile, VersionResult};
pub use commit::{classify, ConventionalCommit};
pub use config::ChartbumpConfig;
pub use error::{ChartbumpError, Result};

/// Version information embedded at compile time.
pub mod version {
    /// The current version of chartbump.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// The git SHA at compile time (if available).
    pub const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

    /// The git commit date at compile time (if available).
    pub const GIT_COMMIT_DATE: Option<&str> = option_env!("VERGEN_GIT_COMMIT_DATE");

    /// Get a formatted version string.
    pub fn version_string() -> String {
        let short = |sha: &str| sha[..7.min(sha.len())].to_string();
        match (GIT_SHA, GIT_COMMIT_DATE) {
            (Some(sha), Some(date)) => format!("{} ({} {})", VERSION, short(sha), date),
            (Some(sha), None) => format!("{} ({})", VERSION, short(sha)),
            _ => VERSION.to_string(),
        }
    }
}

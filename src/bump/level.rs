// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Bump levels and lenient semantic-version arithmetic.

use crate::commit::ConventionalCommit;
use serde::Serialize;
use std::fmt;

/// Magnitude of a version increment. Ordered `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl BumpLevel {
    /// Breaking → major, `feat` → minor, anything else → patch.
    pub fn from_commit(commit: &ConventionalCommit) -> Self {
        if commit.is_breaking {
            BumpLevel::Major
        } else if commit.is_feature() {
            BumpLevel::Minor
        } else {
            BumpLevel::Patch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
            BumpLevel::Major => "major",
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `major.minor.patch` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChartVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ChartVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse leniently: each dot-separated component contributes its
    /// leading decimal digits, and missing or non-numeric components are 0.
    /// Components too large for a `u64` clamp to `u64::MAX`.
    /// Anything after the third component is ignored.
    pub fn parse_lenient(version: &str) -> Self {
        let mut parts = version.split('.').map(leading_number);
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// Apply a bump, resetting lower components. Saturates at `u64::MAX`.
    pub fn bump(&self, level: BumpLevel) -> Self {
        match level {
            BumpLevel::Major => Self::new(self.major.saturating_add(1), 0, 0),
            BumpLevel::Minor => Self::new(self.major, self.minor.saturating_add(1), 0),
            BumpLevel::Patch => Self::new(self.major, self.minor, self.patch.saturating_add(1)),
        }
    }
}

impl fmt::Display for ChartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn leading_number(component: &str) -> u64 {
    let component = component.trim_start();
    let end = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    let digits = &component[..end];
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Bump a version string by `level`.
pub fn bump_version(current: &str, level: BumpLevel) -> String {
    ChartVersion::parse_lenient(current).bump(level).to_string()
}

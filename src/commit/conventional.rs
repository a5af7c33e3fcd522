// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Conventional commit classification.

use crate::error::{CommitError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

lazy_static! {
    /// Header grammar: `type[(scope)][!]: description`.
    static ref HEADER_REGEX: Regex = Regex::new(
        r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?:\s*(?P<description>.+)$"
    )
    .unwrap();

    /// Breaking change footer token, searched in every line after the header.
    static ref BREAKING_FOOTER_REGEX: Regex = Regex::new(r"(?i)BREAKING CHANGE:").unwrap();
}

/// The parts of a commit message that drive versioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConventionalCommit {
    /// Commit type exactly as written (`feat`, `Fix`, ...).
    #[serde(rename = "type")]
    pub commit_type: String,
    /// Optional scope from the parentheses.
    pub scope: Option<String>,
    /// Whether the commit is marked as breaking.
    pub is_breaking: bool,
    /// Trimmed header description.
    pub description: String,
}

impl ConventionalCommit {
    /// Whether the commit type is exactly `feat`.
    pub fn is_feature(&self) -> bool {
        self.commit_type == "feat"
    }
}

impl fmt::Display for ConventionalCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.commit_type)?;
        if let Some(ref scope) = self.scope {
            write!(f, "({})", scope)?;
        }
        if self.is_breaking {
            write!(f, "!")?;
        }
        write!(f, ": {}", self.description)
    }
}

/// Classify a commit message or PR title.
///
/// Only the first line is matched against the header grammar. Every later
/// line is scanned for a `BREAKING CHANGE:` footer, case-insensitively.
pub fn classify(message: &str) -> Result<ConventionalCommit> {
    let mut lines = message.lines();
    let header = lines.next().unwrap_or("").trim();

    let captures = HEADER_REGEX.captures(header).ok_or_else(|| {
        CommitError::InvalidFormat {
            header: header.to_string(),
        }
    })?;

    let commit_type = captures["type"].to_string();
    let scope = captures.name("scope").map(|m| m.as_str().to_string());
    let bang = captures.name("breaking").is_some();
    let description = captures["description"].trim().to_string();

    let breaking_footer = lines.any(|line| BREAKING_FOOTER_REGEX.is_match(line));

    Ok(ConventionalCommit {
        commit_type,
        scope,
        is_breaking: bang || breaking_footer,
        description,
    })
}

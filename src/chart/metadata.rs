// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Minimal chart metadata reader.
//!
//! Only top-level `name`, `version` and `appVersion` scalars are read. The
//! rest of the document is never parsed.

use crate::error::{ChartError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"(?m)^name:[ \t]*(.+)$").unwrap();
    static ref VERSION_REGEX: Regex = Regex::new(r"(?m)^version:[ \t]*(.+)$").unwrap();
    static ref APP_VERSION_REGEX: Regex = Regex::new(r"(?m)^appVersion:[ \t]*(.+)$").unwrap();
}

const QUOTES: &[char] = &['"', '\''];

/// Scalars read from a chart metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub app_version: Option<String>,
}

impl ChartMetadata {
    /// Extract the fields from file contents.
    pub fn parse(content: &str) -> Self {
        Self {
            name: field(&NAME_REGEX, content),
            version: field(&VERSION_REGEX, content),
            app_version: field(&APP_VERSION_REGEX, content),
        }
    }

    /// Read and parse a metadata file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ChartError::ReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }
}

fn field(regex: &Regex, content: &str) -> Option<String> {
    regex
        .captures(content)
        .map(|c| strip_quotes(&c[1]))
        .filter(|value| !value.is_empty())
}

/// Trim and drop one layer of surrounding single or double quotes.
pub fn strip_quotes(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix(QUOTES).unwrap_or(value);
    let value = value.strip_suffix(QUOTES).unwrap_or(value);
    value.trim().to_string()
}

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration module for chartbump.
//!
//! This module handles locating, parsing, and validating chartbump.toml.

pub mod default;
mod loader;
mod schema;

pub use default::example_config;
pub use loader::{find_config_file_from, load_config, parse_config};
pub use schema::*;

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Git integration module.
//!
//! Only what publishing a release needs: stage, commit, push.

pub mod commands;
mod message;
mod repo;

pub use commands::{commit_staged, push_head, stage_paths};
pub use message::{format_chart_list, render_commit_message};
pub use repo::Repository;

#[cfg(test)]
pub(crate) use repo::testing;

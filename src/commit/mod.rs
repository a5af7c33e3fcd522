// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Commit message classification.

mod conventional;

pub use conventional::{classify, ConventionalCommit};

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! GitHub event context and REST access.

mod client;
mod context;

pub use client::{fetch_all_pages, GitHubClient, PullRequestApi};
pub use context::{
    CiContext, CiEnv, EventPayload, HeadCommit, HeadRef, PullRequest, PushCommit, Repository,
    RepositoryOwner,
};

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CI run context: the event payload plus the environment around it.

use crate::bump::{ChangeType, ChangedFile};
use crate::error::{GitHubError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The parts of a GitHub event payload this tool reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequest>,

    #[serde(default)]
    pub head_commit: Option<HeadCommit>,

    #[serde(default)]
    pub commits: Option<Vec<PushCommit>>,

    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,

    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    pub number: u64,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub head: Option<HeadRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadRef {
    #[serde(default, rename = "ref")]
    pub ref_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub message: Option<String>,
}

/// One commit of a push event, with its touched paths.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub added: Vec<String>,

    #[serde(default)]
    pub removed: Vec<String>,

    #[serde(default)]
    pub modified: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

impl EventPayload {
    /// Parse a payload from JSON text.
    pub fn parse(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse the payload file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GitHubError::EventPayload {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| {
            GitHubError::EventPayload {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Environment variables the runner consults.
#[derive(Debug, Clone, Default)]
pub struct CiEnv {
    pub event_path: Option<PathBuf>,
    pub repository: Option<String>,
    pub head_ref: Option<String>,
    pub git_ref: Option<String>,
    pub pr_title: Option<String>,
    pub token: Option<String>,
}

impl CiEnv {
    /// Capture the relevant variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            event_path: non_empty_var("GITHUB_EVENT_PATH").map(PathBuf::from),
            repository: non_empty_var("GITHUB_REPOSITORY"),
            head_ref: non_empty_var("GITHUB_HEAD_REF"),
            git_ref: non_empty_var("GITHUB_REF"),
            pr_title: non_empty_var("PR_TITLE"),
            token: non_empty_var("GITHUB_TOKEN"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Everything known about the triggering CI event.
#[derive(Debug, Clone, Default)]
pub struct CiContext {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub event: EventPayload,
    pub env: CiEnv,
}

impl CiContext {
    /// Build a context from the process environment, reading the event
    /// payload from `event_path` or `GITHUB_EVENT_PATH` when either is set.
    pub fn load(event_path: Option<&Path>) -> Result<Self> {
        let env = CiEnv::from_env();
        let path = event_path
            .map(Path::to_path_buf)
            .or_else(|| env.event_path.clone());

        let event = match path {
            Some(ref p) => {
                tracing::debug!("Reading event payload from {}", p.display());
                EventPayload::read(p)?
            }
            None => EventPayload::default(),
        };

        Ok(Self::new(event, env))
    }

    pub fn new(event: EventPayload, env: CiEnv) -> Self {
        let (owner, repo) = match env.repository.as_deref().and_then(split_repository) {
            Some((owner, repo)) => (Some(owner), Some(repo)),
            None => match event.repository {
                Some(ref r) => (Some(r.owner.login.clone()), Some(r.name.clone())),
                None => (None, None),
            },
        };

        Self {
            owner,
            repo,
            event,
            env,
        }
    }

    pub fn pull_request(&self) -> Option<&PullRequest> {
        self.event.pull_request.as_ref()
    }

    /// `(owner, repo, number)` when this is a pull-request event in a known
    /// repository.
    pub fn pull_request_target(&self) -> Option<(&str, &str, u64)> {
        let pr = self.pull_request()?;
        Some((self.owner.as_deref()?, self.repo.as_deref()?, pr.number))
    }

    /// Pick the message to classify: PR title, head commit, `PR_TITLE`,
    /// then `default`.
    pub fn resolve_commit_message(&self, default: &str) -> String {
        let candidates = [
            self.pull_request().and_then(|pr| pr.title.as_deref()),
            self.event
                .head_commit
                .as_ref()
                .and_then(|c| c.message.as_deref()),
            self.env.pr_title.as_deref(),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Branch to push to, if it can be determined.
    pub fn resolve_target_branch(&self) -> Option<String> {
        let head_ref = self
            .pull_request()
            .and_then(|pr| pr.head.as_ref())
            .and_then(|h| h.ref_name.clone())
            .or_else(|| self.env.head_ref.clone())
            .filter(|b| !b.is_empty());
        if head_ref.is_some() {
            return head_ref;
        }

        self.event
            .git_ref
            .as_deref()
            .or(self.env.git_ref.as_deref())
            .and_then(|r| r.strip_prefix("refs/heads/"))
            .filter(|b| !b.is_empty())
            .map(str::to_string)
    }

    /// Paths touched by a push event, in payload order.
    ///
    /// Returns `None` when the payload carries no commit list.
    pub fn push_changed_files(&self) -> Option<Vec<ChangedFile>> {
        let commits = self.event.commits.as_ref()?;
        let mut files = Vec::new();
        for commit in commits {
            files.extend(
                commit
                    .added
                    .iter()
                    .map(|p| ChangedFile::new(p.clone(), ChangeType::Added)),
            );
            files.extend(
                commit
                    .removed
                    .iter()
                    .map(|p| ChangedFile::new(p.clone(), ChangeType::Removed)),
            );
            files.extend(commit.modified.iter().map(ChangedFile::modified));
        }
        Some(files)
    }
}

fn split_repository(full_name: &str) -> Option<(String, String)> {
    let (owner, repo) = full_name.split_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

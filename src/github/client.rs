// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Minimal GitHub REST client: changed files and labels of a pull request.

use crate::bump::{ChangeType, ChangedFile};
use crate::config::GitHubConfig;
use crate::error::{GitHubError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Pull-request queries the pipeline needs.
pub trait PullRequestApi {
    /// Every file changed by the pull request, across all pages.
    fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>>;

    /// Names of the labels on the pull request.
    fn list_labels(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct PullFile {
    filename: String,
    status: ChangeType,
}

#[derive(Debug, Deserialize)]
struct Label {
    name: String,
}

/// Blocking HTTP client for the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::blocking::Client,
    api_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("chartbump/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::RequestFailed {
                url: config.api_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            per_page: config.per_page,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| GitHubError::RequestFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(GitHubError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        response.json::<T>().map_err(|e| {
            GitHubError::RequestFailed {
                url: url.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl PullRequestApi for GitHubClient {
    fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>> {
        let files: Vec<PullFile> = fetch_all_pages(self.per_page, |page| {
            let url = format!(
                "{}/repos/{}/{}/pulls/{}/files?per_page={}&page={}",
                self.api_url, owner, repo, number, self.per_page, page
            );
            self.get_json(&url)
        })?;

        Ok(files
            .into_iter()
            .map(|f| ChangedFile::new(f.filename, f.status))
            .collect())
    }

    fn list_labels(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<String>> {
        let labels: Vec<Label> = fetch_all_pages(self.per_page, |page| {
            let url = format!(
                "{}/repos/{}/{}/issues/{}/labels?per_page={}&page={}",
                self.api_url, owner, repo, number, self.per_page, page
            );
            self.get_json(&url)
        })?;

        Ok(labels.into_iter().map(|l| l.name).collect())
    }
}

/// Request pages 1, 2, ... until one comes back shorter than `per_page`.
pub fn fetch_all_pages<T, F>(per_page: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Result<Vec<T>>,
{
    let per_page = per_page.max(1) as usize;
    let mut all = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch(page)?;
        let len = batch.len();
        all.extend(batch);
        if len < per_page {
            break;
        }
        page += 1;
    }

    Ok(all)
}

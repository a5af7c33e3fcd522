// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Repository operations.

use crate::error::{ChartbumpError, GitError, Result};
use git2::{Repository as Git2Repo, StatusOptions, StatusShow};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with additional functionality.
pub struct Repository {
    inner: Git2Repo,
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Git2Repo::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                ChartbumpError::Git(GitError::NotARepository)
            } else {
                ChartbumpError::Git(GitError::OpenFailed {
                    message: e.message().to_string(),
                })
            }
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                ChartbumpError::Git(GitError::OpenFailed {
                    message: "Repository has no working directory (bare repository)".to_string(),
                })
            })?
            .to_path_buf();

        Ok(Self {
            inner: repo,
            workdir,
        })
    }

    pub fn inner(&self) -> &Git2Repo {
        &self.inner
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Express `path` relative to the working directory.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        if !path.is_absolute() {
            return path.to_path_buf();
        }
        if let Ok(rel) = path.strip_prefix(&self.workdir) {
            return rel.to_path_buf();
        }

        // Temp dirs and symlinked checkouts may differ only after resolution.
        match (path.canonicalize(), self.workdir.canonicalize()) {
            (Ok(p), Ok(w)) => p
                .strip_prefix(&w)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf()),
            _ => path.to_path_buf(),
        }
    }

    /// Check if there are staged changes.
    pub fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.staged_paths()?.is_empty())
    }

    /// Paths with changes in the index relative to HEAD.
    pub fn staged_paths(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.show(StatusShow::Index).include_untracked(false);

        let statuses = self
            .inner
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::CommandFailed {
                command: "status".to_string(),
                message: e.message().to_string(),
            })?;

        Ok(statuses
            .iter()
            .filter(|s| !s.status().is_empty())
            .filter_map(|s| s.path().map(str::to_string))
            .collect())
    }

    /// The HEAD commit, if the branch has one.
    pub fn head_commit(&self) -> Option<git2::Commit<'_>> {
        self.inner.head().ok()?.peel_to_commit().ok()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::init_repo;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_repo() {
        let (dir, repo) = init_repo();
        std::fs::create_dir_all(dir.path().join("charts/web")).unwrap();
        assert!(Repository::open(&dir.path().join("charts/web")).is_ok());
        assert!(repo.head_commit().is_some());
    }

    #[test]
    fn test_not_a_repo() {
        let dir = TempDir::new().unwrap();
        let result = Repository::open(dir.path());
        assert!(matches!(
            result,
            Err(ChartbumpError::Git(GitError::NotARepository))
        ));
    }

    #[test]
    fn test_clean_repo_has_nothing_staged() {
        let (_dir, repo) = init_repo();
        assert!(!repo.has_staged_changes().unwrap());
    }

    #[test]
    fn test_relative_path() {
        let (_dir, repo) = init_repo();
        let abs = repo.workdir().join("charts/web/Chart.yaml");
        assert_eq!(
            repo.relative_path(&abs),
            PathBuf::from("charts/web/Chart.yaml")
        );
        assert_eq!(
            repo.relative_path(Path::new("docs/index.yaml")),
            PathBuf::from("docs/index.yaml")
        );
    }
}

// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Staging, committing and pushing release changes.

use crate::error::{ChartbumpError, GitError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::repo::Repository;

fn index_error(command: &str, e: git2::Error) -> ChartbumpError {
    ChartbumpError::Git(GitError::CommandFailed {
        command: command.to_string(),
        message: e.message().to_string(),
    })
}

/// Stage files and directories, returning how many paths were added.
///
/// Directories are staged recursively. Paths that do not exist are skipped.
pub fn stage_paths(repo: &Repository, paths: &[PathBuf]) -> Result<usize> {
    let mut index = repo.inner().index().map_err(|e| index_error("index", e))?;
    let mut staged = 0;

    for path in paths {
        let relative = repo.relative_path(path);
        let absolute = repo.workdir().join(&relative);
        let pathspec = relative.to_string_lossy().replace('\\', "/");

        if absolute.is_dir() {
            index
                .add_all([pathspec.as_str()].iter(), git2::IndexAddOption::DEFAULT, None)
                .map_err(|e| index_error(&format!("add {}", pathspec), e))?;
        } else if absolute.is_file() {
            index
                .add_path(&relative)
                .map_err(|e| index_error(&format!("add {}", pathspec), e))?;
        } else {
            tracing::debug!("Not staging missing path {}", pathspec);
            continue;
        }
        staged += 1;
    }

    index.write().map_err(|e| index_error("write index", e))?;
    Ok(staged)
}

/// Commit the index as `name <email>`, returning the new commit id.
pub fn commit_staged(repo: &Repository, message: &str, name: &str, email: &str) -> Result<String> {
    if !repo.has_staged_changes()? {
        return Err(ChartbumpError::Git(GitError::NoStagedChanges));
    }

    let commit_error = |context: &str, e: git2::Error| {
        ChartbumpError::Git(GitError::CommitFailed {
            message: format!("{}: {}", context, e.message()),
        })
    };

    let sig = git2::Signature::now(name, email)
        .map_err(|e| commit_error("Invalid signature", e))?;

    let mut index = repo
        .inner()
        .index()
        .map_err(|e| commit_error("Failed to get index", e))?;
    let tree_id = index
        .write_tree()
        .map_err(|e| commit_error("Failed to write tree", e))?;
    let tree = repo
        .inner()
        .find_tree(tree_id)
        .map_err(|e| commit_error("Failed to find tree", e))?;

    let parents: Vec<git2::Commit<'_>> = repo.head_commit().into_iter().collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

    let oid = repo
        .inner()
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .map_err(|e| commit_error("Failed to commit", e))?;

    Ok(oid.to_string())
}

/// `git push <remote> HEAD:refs/heads/<branch>` from `workdir`.
pub fn push_head(workdir: &Path, remote: &str, branch: &str) -> Result<()> {
    let refspec = format!("HEAD:refs/heads/{}", branch);
    let command = format!("git push {} {}", remote, refspec);
    tracing::debug!("Running: {}", command);

    let output = Command::new("git")
        .args(["push", remote, &refspec])
        .current_dir(workdir)
        .output()
        .map_err(|e| GitError::CommandFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(())
}

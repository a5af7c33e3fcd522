// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! External command execution.

use crate::error::{HelmError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Run `program` with `args`, returning stdout on success.
    fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    cwd: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from `cwd` instead of the process working directory.
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let command = display_command(program, args);
        tracing::debug!("Running: {}", command);

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output().map_err(|e| HelmError::SpawnFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(HelmError::CommandFailed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Render a command line for logs and errors.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

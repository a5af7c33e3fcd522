// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Chart packaging and repository index generation.
//!
//! The packaging tool is treated as an external command; see
//! [`CommandRunner`] for the seam used in tests.

mod runner;

pub use runner::{display_command, CommandRunner, SystemRunner};

use crate::config::HelmConfig;
use crate::error::Result;
use crate::error::ResultExt;
use std::path::Path;

/// Packages charts and regenerates the repository index.
pub struct HelmPackager<R: CommandRunner> {
    runner: R,
    binary: String,
    dependency_update: bool,
}

impl<R: CommandRunner> HelmPackager<R> {
    pub fn new(runner: R, config: &HelmConfig) -> Self {
        Self {
            runner,
            binary: config.binary.clone(),
            dependency_update: config.dependency_update,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `dep update` the chart, then package it into `output_dir`.
    pub fn package_chart(&self, chart_dir: &Path, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)
            .context(format!("creating {}", output_dir.display()))?;

        let chart = chart_dir.display().to_string();
        if self.dependency_update {
            self.helm(vec!["dep".into(), "update".into(), chart.clone()])?;
        }
        self.helm(vec![
            "package".into(),
            chart,
            "-d".into(),
            output_dir.display().to_string(),
        ])?;
        Ok(())
    }

    /// Rebuild `index.yaml` in `output_dir` for charts served at `repo_url`.
    pub fn regenerate_index(&self, output_dir: &Path, repo_url: &str) -> Result<()> {
        self.helm(vec![
            "repo".into(),
            "index".into(),
            output_dir.display().to_string(),
            "--url".into(),
            repo_url.to_string(),
        ])?;
        Ok(())
    }

    fn helm(&self, args: Vec<String>) -> Result<String> {
        self.runner.run(&self.binary, &args)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::HelmError;
    use std::cell::RefCell;

    /// Records command lines; fails any whose line contains `fail_on`.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: RefCell<Vec<String>>,
        pub fail_on: Option<String>,
    }

    impl RecordingRunner {
        pub fn failing_on(pattern: &str) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on: Some(pattern.to_string()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<String> {
            let line = display_command(program, args);
            self.calls.borrow_mut().push(line.clone());
            match self.fail_on {
                Some(ref pattern) if line.contains(pattern.as_str()) => {
                    Err(HelmError::CommandFailed {
                        command: line,
                        status: 1,
                        stderr: "simulated failure".to_string(),
                    }
                    .into())
                }
                _ => Ok(String::new()),
            }
        }
    }
}

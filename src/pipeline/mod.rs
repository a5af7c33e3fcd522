// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The end-to-end CI run.
//!
//! Gathers the changed files of the triggering event, resolves new chart
//! versions, rewrites chart metadata, packages the charts, regenerates the
//! repository index and, in pull-request mode, commits and pushes the
//! result back to the source branch.
//!
//! Only an unreadable configuration or a failed metadata write aborts a run.
//! Everything after resolution degrades to a warning on the [`RunReport`].

mod report;

pub use report::{PipelineOptions, RunReport};

use crate::bump::{BumpResolver, ChangedFile, VersionResult};
use crate::chart::{find_all_charts, update_chart_version_files, ChartInfo, ChartLocator};
use crate::config::ChartbumpConfig;
use crate::error::Result;
use crate::git::{self, Repository};
use crate::github::{CiContext, PullRequestApi};
use crate::helm::{CommandRunner, HelmPackager};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One configured run over a repository checkout.
pub struct Pipeline<'a, R: CommandRunner> {
    root: PathBuf,
    config: &'a ChartbumpConfig,
    packager: HelmPackager<R>,
    github: Option<&'a dyn PullRequestApi>,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(root: impl Into<PathBuf>, config: &'a ChartbumpConfig, runner: R) -> Self {
        Self {
            root: root.into(),
            config,
            packager: HelmPackager::new(runner, &config.helm),
            github: None,
        }
    }

    /// Use `api` for pull-request files and labels.
    pub fn with_github(mut self, api: &'a dyn PullRequestApi) -> Self {
        self.github = Some(api);
        self
    }

    pub fn packager(&self) -> &HelmPackager<R> {
        &self.packager
    }

    fn charts_dir(&self) -> PathBuf {
        self.root.join(&self.config.charts.root)
    }

    fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.helm.output_dir)
    }

    /// Execute the run for the event in `ctx`.
    pub fn run(&self, ctx: &CiContext, options: PipelineOptions) -> Result<RunReport> {
        let mut report = RunReport {
            dry_run: options.dry_run,
            ..RunReport::default()
        };

        if options.pull_request_mode && self.has_manual_label(ctx, &mut report) {
            return Ok(report.skip(&format!(
                "PR has label '{}'. Skipping automatic versioning.",
                self.config.versioning.manual_label
            )));
        }

        let all = self.changed_files(ctx, &mut report);
        tracing::info!("Detected {} changed file(s) in total", all.len());
        for file in &all {
            tracing::info!(" - {}: {}", file.change_type, file.path);
        }

        let changed = self.filter_changes(all);
        report.changed_files = changed.len();
        tracing::info!(
            "Detected {} changed file(s) under {}/",
            changed.len(),
            self.charts_prefix()
        );
        if changed.is_empty() {
            return Ok(report.skip("No chart changes detected. Exiting."));
        }

        let discovered = find_all_charts(
            &self.charts_dir(),
            &self.config.charts.metadata_file,
            &self.config.charts.exclude,
        );
        let mut by_name: BTreeMap<&str, &ChartInfo> = BTreeMap::new();
        for chart in &discovered {
            by_name.entry(chart.name.as_str()).or_insert(chart);
        }

        let mut versions = self.resolve(ctx, &changed, &mut report)?;
        drop_excluded(&mut versions, &self.config.charts.exclude);
        report.versions = versions;
        if report.versions.is_empty() {
            return Ok(report.skip("No chart versions to update. Exiting."));
        }
        if options.dry_run {
            tracing::info!("Dry run: not writing {} chart(s)", report.versions.len());
            return Ok(report);
        }

        let versions = report.versions.clone();
        for (name, version) in &versions {
            let written = update_chart_version_files(
                &self.charts_dir(),
                &self.config.charts.metadata_file,
                std::slice::from_ref(name),
                version,
            )?;
            report.updated_files.extend(written);

            let chart = match by_name.get(name.as_str()) {
                Some(chart) => *chart,
                None => {
                    report.warn(format!(
                        "Cannot package {}: path not found in discovery map",
                        name
                    ));
                    continue;
                }
            };
            tracing::info!("Updated {} ({}) -> {}", name, chart.path, version);

            let chart_dir = match chart.chart_dir() {
                "" => self.charts_dir(),
                dir => self.charts_dir().join(dir),
            };
            match self.packager.package_chart(&chart_dir, &self.output_dir()) {
                Ok(()) => {
                    tracing::info!("Packaged {} -> {}", name, self.output_dir().display());
                    report.packaged.push(name.clone());
                }
                Err(e) => report.warn(format!("Packaging failed for {}: {}", name, e)),
            }
        }

        match self
            .packager
            .regenerate_index(&self.output_dir(), &self.config.helm.repo_url)
        {
            Ok(()) => {
                tracing::info!("Regenerated Helm index");
                report.index_regenerated = true;
            }
            Err(e) => report.warn(format!("Failed to regenerate Helm index: {}", e)),
        }

        let repo = match Repository::open(&self.root) {
            Ok(repo) => repo,
            Err(e) => {
                report.warn(format!("Failed staging files: {}", e));
                return Ok(report);
            }
        };

        let mut to_stage = Vec::new();
        if report.index_regenerated {
            to_stage.push(self.output_dir().join("index.yaml"));
        }
        to_stage.push(self.output_dir());
        to_stage.extend(metadata_paths(&self.charts_dir(), &discovered, &versions));
        if let Err(e) = git::stage_paths(&repo, &to_stage) {
            report.warn(format!("Failed staging files: {}", e));
        }

        if options.pull_request_mode {
            self.commit_and_push(&repo, ctx, &versions, &mut report);
        }

        Ok(report)
    }

    fn has_manual_label(&self, ctx: &CiContext, report: &mut RunReport) -> bool {
        let (owner, repo, number) = match ctx.pull_request_target() {
            Some(target) => target,
            None => return false,
        };
        let api = match self.github {
            Some(api) => api,
            None => return false,
        };

        match api.list_labels(owner, repo, number) {
            Ok(labels) => labels
                .iter()
                .any(|l| *l == self.config.versioning.manual_label),
            Err(e) => {
                report.warn(format!("Failed to check PR labels: {}", e));
                false
            }
        }
    }

    fn changed_files(&self, ctx: &CiContext, report: &mut RunReport) -> Vec<ChangedFile> {
        if let Some((owner, repo, number)) = ctx.pull_request_target() {
            return match self.github {
                Some(api) => match api.list_pull_request_files(owner, repo, number) {
                    Ok(files) => files,
                    Err(e) => {
                        report.warn(format!("Failed to list pull request files: {}", e));
                        Vec::new()
                    }
                },
                None => {
                    report.warn("No GitHub client available to list pull request files.");
                    Vec::new()
                }
            };
        }

        match ctx.push_changed_files() {
            Some(files) => files,
            None => {
                report.warn("No pull_request or commits found in the context payload.");
                Vec::new()
            }
        }
    }

    fn charts_prefix(&self) -> String {
        let root = self.config.charts.root.to_string_lossy().replace('\\', "/");
        root.trim_end_matches('/').to_string()
    }

    /// Keep changes under the charts root that no `exclude_paths` glob matches.
    fn filter_changes(&self, files: Vec<ChangedFile>) -> Vec<ChangedFile> {
        let prefix = format!("{}/", self.charts_prefix());
        let excluded: Vec<glob::Pattern> = self
            .config
            .charts
            .exclude_paths
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();

        files
            .into_iter()
            .filter(|f| f.path.replace('\\', "/").starts_with(&prefix))
            .filter(|f| {
                let hit = excluded.iter().any(|p| p.matches(&f.path));
                if hit {
                    tracing::debug!("Excluded by exclude_paths: {}", f.path);
                }
                !hit
            })
            .collect()
    }

    fn resolve(
        &self,
        ctx: &CiContext,
        changed: &[ChangedFile],
        report: &mut RunReport,
    ) -> Result<VersionResult> {
        let locator = ChartLocator::new(&self.root)
            .with_metadata_file(self.config.charts.metadata_file.clone());
        let resolver = BumpResolver::new(locator);

        let message = ctx.resolve_commit_message(&self.config.versioning.default_message);
        match resolver.resolve(changed, &message) {
            Ok(versions) => Ok(versions),
            Err(e) if e.is_invalid_format() => {
                report.warn(format!(
                    "Non-conventional commit/PR title detected. Falling back to patch bump. Reason: {}",
                    e
                ));
                resolver.resolve(changed, &self.config.versioning.fallback_message)
            }
            Err(e) => Err(e),
        }
    }

    fn commit_and_push(
        &self,
        repo: &Repository,
        ctx: &CiContext,
        versions: &VersionResult,
        report: &mut RunReport,
    ) {
        match repo.has_staged_changes() {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("No staged changes to commit.");
                return;
            }
            Err(e) => {
                report.warn(format!("Failed to inspect staged changes: {}", e));
                return;
            }
        }

        let publish = &self.config.publish;
        let message = match git::render_commit_message(&publish.message_template, versions) {
            Ok(message) => message,
            Err(e) => {
                report.warn(format!("Failed to render commit message: {}", e));
                return;
            }
        };

        match git::commit_staged(repo, &message, &publish.user_name, &publish.user_email) {
            Ok(id) => {
                tracing::info!("Committed {}", id);
                report.commit = Some(id);
            }
            Err(e) => {
                report.warn(format!("Failed to commit: {}", e));
                return;
            }
        }

        let branch = match ctx.resolve_target_branch() {
            Some(branch) => branch,
            None => {
                report.warn("Cannot determine target branch; skipping push.");
                return;
            }
        };

        match git::push_head(repo.workdir(), &publish.remote, &branch) {
            Ok(()) => {
                tracing::info!("Pushed to {}/{}", publish.remote, branch);
                report.pushed_to = Some(branch);
            }
            Err(e) => report.warn(format!("Failed to push: {}", e)),
        }
    }
}

/// Remove charts named in `exclude` from `versions`.
pub fn drop_excluded(versions: &mut VersionResult, exclude: &[String]) {
    versions.retain(|name, version| {
        let keep = !exclude.contains(name);
        if !keep {
            tracing::debug!("Excluded by charts.exclude: {} ({})", name, version);
        }
        keep
    });
}

/// Metadata files of every discovered chart named in `versions`.
fn metadata_paths(charts_dir: &Path, charts: &[ChartInfo], versions: &VersionResult) -> Vec<PathBuf> {
    charts
        .iter()
        .filter(|c| versions.contains_key(&c.name))
        .map(|c| charts_dir.join(&c.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bump::ChangeType;
    use crate::chart::fixtures;
    use crate::error::GitHubError;
    use crate::git::testing::init_repo;
    use crate::github::{CiEnv, EventPayload};
    use crate::helm::testing::RecordingRunner;
    use std::fs;

    struct MockApi {
        files: Vec<ChangedFile>,
        labels: Vec<String>,
        labels_fail: bool,
    }

    impl MockApi {
        fn with_files(paths: &[&str]) -> Self {
            Self {
                files: paths.iter().map(|p| ChangedFile::modified(*p)).collect(),
                labels: Vec::new(),
                labels_fail: false,
            }
        }
    }

    impl PullRequestApi for MockApi {
        fn list_pull_request_files(&self, _: &str, _: &str, _: u64) -> Result<Vec<ChangedFile>> {
            Ok(self.files.clone())
        }

        fn list_labels(&self, _: &str, _: &str, _: u64) -> Result<Vec<String>> {
            if self.labels_fail {
                return Err(GitHubError::HttpStatus {
                    url: "https://api.github.com/labels".to_string(),
                    status: 500,
                }
                .into());
            }
            Ok(self.labels.clone())
        }
    }

    fn config() -> ChartbumpConfig {
        let mut config = ChartbumpConfig::default();
        config.charts.root = PathBuf::from("good-charts");
        config
    }

    fn push_context(message: &str, modified: &[&str]) -> CiContext {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "head_commit": { "message": message },
            "commits": [ { "modified": modified } ]
        });
        CiContext::new(
            EventPayload::parse(&payload.to_string()).unwrap(),
            CiEnv::default(),
        )
    }

    fn pr_context(title: &str) -> CiContext {
        let payload = serde_json::json!({
            "pull_request": {
                "number": 7,
                "title": title,
                "head": { "ref": "feature/charts" }
            },
            "repository": { "name": "charts", "owner": { "login": "interledger" } }
        });
        CiContext::new(
            EventPayload::parse(&payload.to_string()).unwrap(),
            CiEnv::default(),
        )
    }

    const LOCAL: PipelineOptions = PipelineOptions {
        pull_request_mode: false,
        dry_run: false,
    };

    #[test]
    fn test_push_run_updates_and_packages() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context(
            "feat: add ingress",
            &["good-charts/top1/values.yaml", "good-charts/nested/nested2/templates/svc.yaml"],
        );

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert_eq!(report.versions.get("top1").map(String::as_str), Some("2.3.0"));
        assert_eq!(report.versions.get("nested2").map(String::as_str), Some("1.3.0"));
        assert_eq!(report.packaged, vec!["nested2", "top1"]);
        assert!(report.index_regenerated);

        let top1 = fs::read_to_string(dir.path().join("good-charts/top1/Chart.yaml")).unwrap();
        assert!(top1.contains("version: 2.3.0"));
        assert!(top1.contains("appVersion: v2.4.4"));

        let charts = dir.path().join("good-charts");
        let out = dir.path().join("docs/interledger");
        let calls = pipeline.packager().runner().calls();
        assert_eq!(
            calls,
            vec![
                format!("helm dep update {}", charts.join("nested/nested2").display()),
                format!(
                    "helm package {} -d {}",
                    charts.join("nested/nested2").display(),
                    out.display()
                ),
                format!("helm dep update {}", charts.join("top1").display()),
                format!(
                    "helm package {} -d {}",
                    charts.join("top1").display(),
                    out.display()
                ),
                format!(
                    "helm repo index {} --url https://interledger.org/charts/",
                    out.display()
                ),
            ]
        );

        // Not a git checkout: staging degrades to a warning.
        assert!(report.warnings.iter().any(|w| w.starts_with("Failed staging files")));
        assert!(report.commit.is_none());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context("fix!: drop legacy values", &["good-charts/top2/values.yaml"]);

        let report = pipeline
            .run(
                &ctx,
                PipelineOptions {
                    pull_request_mode: false,
                    dry_run: true,
                },
            )
            .unwrap();

        assert_eq!(report.versions.get("top2").map(String::as_str), Some("4.0.0"));
        assert!(report.dry_run);
        assert!(pipeline.packager().runner().calls().is_empty());
        let top2 = fs::read_to_string(dir.path().join("good-charts/top2/Chart.yaml")).unwrap();
        assert!(top2.contains("version: 3.2.3"));
    }

    #[test]
    fn test_invalid_message_falls_back_to_patch() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context("Update the nested chart", &["good-charts/nested/nested1/values.yaml"]);

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert_eq!(report.versions.get("nested1").map(String::as_str), Some("1.0.1"));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("Non-conventional commit/PR title detected")));
    }

    #[test]
    fn test_changes_outside_charts_root_exit_early() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context("feat: tooling", &["tooling/some-script.js", "some-other-file.txt"]);

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert_eq!(report.skipped.as_deref(), Some("No chart changes detected. Exiting."));
        assert!(report.versions.is_empty());
        assert!(pipeline.packager().runner().calls().is_empty());
    }

    #[test]
    fn test_exclude_paths_filter() {
        let dir = fixtures::good_charts();
        let mut config = config();
        config.charts.exclude_paths = vec!["**/README.md".to_string()];
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context(
            "docs: readme",
            &["good-charts/top1/README.md", "good-charts/top2/values.yaml"],
        );

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert_eq!(report.changed_files, 1);
        assert!(!report.versions.contains_key("top1"));
        assert_eq!(report.versions.get("top2").map(String::as_str), Some("3.2.4"));
    }

    #[test]
    fn test_excluded_chart_is_left_alone() {
        let dir = fixtures::good_charts();
        let mut config = config();
        config.charts.exclude = vec!["top1".to_string()];
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context(
            "fix: x",
            &["good-charts/top1/values.yaml", "good-charts/top2/values.yaml"],
        );

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert!(!report.versions.contains_key("top1"));
        assert_eq!(report.versions.get("top2").map(String::as_str), Some("3.2.4"));
        assert_eq!(report.packaged, vec!["top2"]);
        assert!(!report.warnings.iter().any(|w| w.contains("discovery map")));
        let top1 = fs::read_to_string(dir.path().join("good-charts/top1/Chart.yaml")).unwrap();
        assert!(top1.contains("version: 2.2.3"));
    }

    #[test]
    fn test_only_excluded_charts_changed() {
        let dir = fixtures::good_charts();
        let mut config = config();
        config.charts.exclude = vec!["top1".to_string()];
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());
        let ctx = push_context("fix: x", &["good-charts/top1/values.yaml"]);

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert_eq!(
            report.skipped.as_deref(),
            Some("No chart versions to update. Exiting.")
        );
        assert!(pipeline.packager().runner().calls().is_empty());
    }

    #[test]
    fn test_packaging_failure_is_a_warning() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::failing_on("package"));
        let ctx = push_context("fix: probe", &["good-charts/top1/values.yaml"]);

        let report = pipeline.run(&ctx, LOCAL).unwrap();

        assert!(report.packaged.is_empty());
        assert!(report.index_regenerated);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("Packaging failed for top1")));
        let top1 = fs::read_to_string(dir.path().join("good-charts/top1/Chart.yaml")).unwrap();
        assert!(top1.contains("version: 2.2.4"));
    }

    #[test]
    fn test_no_event_data_warns() {
        let dir = fixtures::good_charts();
        let config = config();
        let pipeline = Pipeline::new(dir.path(), &config, RecordingRunner::default());

        let report = pipeline.run(&CiContext::default(), LOCAL).unwrap();

        assert!(report.skipped.is_some());
        assert_eq!(
            report.warnings,
            vec!["No pull_request or commits found in the context payload."]
        );
    }

    #[test]
    fn test_manual_label_skips_run() {
        let dir = fixtures::good_charts();
        let config = config();
        let mut api = MockApi::with_files(&["good-charts/top1/values.yaml"]);
        api.labels = vec!["dependencies".to_string(), "manual-versioning".to_string()];
        let pipeline =
            Pipeline::new(dir.path(), &config, RecordingRunner::default()).with_github(&api);

        let report = pipeline
            .run(&pr_context("feat: web"), PipelineOptions::default())
            .unwrap();

        assert!(report.skipped.unwrap().contains("manual-versioning"));
        assert!(report.versions.is_empty());
    }

    #[test]
    fn test_label_lookup_failure_continues() {
        let dir = fixtures::good_charts();
        let config = config();
        let mut api = MockApi::with_files(&["good-charts/top1/values.yaml"]);
        api.labels_fail = true;
        let pipeline =
            Pipeline::new(dir.path(), &config, RecordingRunner::default()).with_github(&api);

        let report = pipeline
            .run(
                &pr_context("feat: web"),
                PipelineOptions {
                    pull_request_mode: true,
                    dry_run: true,
                },
            )
            .unwrap();

        assert!(report.warnings[0].starts_with("Failed to check PR labels"));
        assert_eq!(report.versions.get("top1").map(String::as_str), Some("2.3.0"));
    }

    #[test]
    fn test_pull_request_run_commits_with_bot_identity() {
        let (dir, repo) = init_repo();
        let chart_dir = dir.path().join("charts/web");
        fs::create_dir_all(chart_dir.join("templates")).unwrap();
        fs::write(chart_dir.join("Chart.yaml"), "apiVersion: v2\nname: web\nversion: 0.9.2\n")
            .unwrap();
        fs::write(chart_dir.join("templates/deploy.yaml"), "kind: Deployment\n").unwrap();

        let config = ChartbumpConfig::default();
        let api = MockApi {
            files: vec![ChangedFile::new("charts/web/templates/deploy.yaml", ChangeType::Added)],
            labels: Vec::new(),
            labels_fail: false,
        };
        let pipeline =
            Pipeline::new(dir.path(), &config, RecordingRunner::default()).with_github(&api);

        let report = pipeline
            .run(&pr_context("feat(web): add deployment"), PipelineOptions::default())
            .unwrap();

        assert_eq!(report.versions.get("web").map(String::as_str), Some("0.10.0"));
        assert!(report.commit.is_some());

        let head = repo.head_commit().unwrap();
        assert_eq!(head.author().name(), Some("github-actions[bot]"));
        assert_eq!(
            head.message(),
            Some("chore(version): bump charts web@0.10.0")
        );
        let chart = fs::read_to_string(chart_dir.join("Chart.yaml")).unwrap();
        assert!(chart.contains("version: 0.10.0\nappVersion: v0.10.0"));

        // No `origin` remote in the fixture repository.
        assert!(!report.pushed());
        assert!(report.warnings.iter().any(|w| w.starts_with("Failed to push")));
    }

    #[test]
    fn test_metadata_paths() {
        let dir = fixtures::good_charts();
        let charts_dir = dir.path().join("good-charts");
        let charts = find_all_charts(&charts_dir, "Chart.yaml", &[]);
        let mut versions = VersionResult::new();
        versions.insert("nested1".to_string(), "1.0.1".to_string());

        assert_eq!(
            metadata_paths(&charts_dir, &charts, &versions),
            vec![charts_dir.join("nested/nested1/Chart.yaml")]
        );
    }
}

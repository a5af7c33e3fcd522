// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Command dispatch and execution.

use crate::bump::{BumpResolver, ChangedFile};
use crate::chart::{find_all_charts, ChartLocator};
use crate::config::ChartbumpConfig;
use crate::error::{ChartbumpError, Result};

use super::args::{ChartsArgs, ClassifyArgs, Cli, Commands, InitArgs, ResolveArgs, RunArgs};
use super::output;

/// Run the CLI with the given arguments.
pub fn run(cli: Cli) -> Result<()> {
    match cli.effective_command() {
        Commands::Run(args) => run_pipeline(&cli, &load_config(&cli)?, args),
        Commands::Resolve(args) => run_resolve(&cli, &load_config(&cli)?, args),
        Commands::Classify(args) => run_classify(&cli, args),
        Commands::Charts(args) => run_charts(&cli, &load_config(&cli)?, args),
        Commands::Version => run_version(),
        Commands::Init(args) => run_init(&cli, args),
    }
}

/// `--config`, else the nearest config file above `--root`, else defaults.
fn load_config(cli: &Cli) -> Result<ChartbumpConfig> {
    if let Some(ref path) = cli.config {
        return ChartbumpConfig::load_from(path);
    }
    let start = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());
    ChartbumpConfig::load(&start)
}

/// Run the CI pipeline.
fn run_pipeline(cli: &Cli, config: &ChartbumpConfig, args: RunArgs) -> Result<()> {
    use crate::github::{CiContext, GitHubClient};
    use crate::helm::SystemRunner;
    use crate::pipeline::{Pipeline, PipelineOptions};

    tracing::debug!("Running pipeline with args: {:?}", args);

    let ctx = CiContext::load(args.event.as_deref())?;
    let client = GitHubClient::new(&config.github, ctx.env.token.clone())?;
    let options = PipelineOptions {
        pull_request_mode: !args.local,
        dry_run: args.dry_run,
    };

    let report = Pipeline::new(&cli.root, config, SystemRunner::in_dir(&cli.root))
        .with_github(&client)
        .run(&ctx, options)?;

    output::print_report(&report, cli.format);
    Ok(())
}

/// Resolve versions for explicit paths.
fn run_resolve(cli: &Cli, config: &ChartbumpConfig, args: ResolveArgs) -> Result<()> {
    tracing::debug!("Running resolve command with args: {:?}", args);

    let changes: Vec<ChangedFile> = args.paths.iter().map(ChangedFile::modified).collect();
    let locator =
        ChartLocator::new(&cli.root).with_metadata_file(config.charts.metadata_file.clone());
    let resolver = BumpResolver::new(locator);

    let mut versions = match (resolver.resolve(&changes, &args.message), args.fallback) {
        (Err(e), Some(ref fallback)) if e.is_invalid_format() => {
            tracing::warn!("{}; falling back to {:?}", e, fallback);
            resolver.resolve(&changes, fallback)?
        }
        (result, _) => result?,
    };
    crate::pipeline::drop_excluded(&mut versions, &config.charts.exclude);

    output::print_versions(&versions, cli.format);
    Ok(())
}

/// Classify a message.
fn run_classify(cli: &Cli, args: ClassifyArgs) -> Result<()> {
    let commit = crate::commit::classify(&args.message)?;
    output::print_classification(&commit, cli.format);
    Ok(())
}

/// List discovered charts.
fn run_charts(cli: &Cli, config: &ChartbumpConfig, args: ChartsArgs) -> Result<()> {
    let mut exclude = config.charts.exclude.clone();
    exclude.extend(args.exclude);

    let charts = find_all_charts(
        &cli.root.join(&config.charts.root),
        &config.charts.metadata_file,
        &exclude,
    );
    output::print_charts(&charts, cli.format);
    Ok(())
}

/// Run the version command.
fn run_version() -> Result<()> {
    println!("chartbump {}", crate::version::version_string());

    if let Some(sha) = crate::version::GIT_SHA {
        println!("git commit: {}", sha);
    }
    if let Some(date) = crate::version::GIT_COMMIT_DATE {
        println!("commit date: {}", date);
    }

    Ok(())
}

/// Run the init command.
fn run_init(cli: &Cli, args: InitArgs) -> Result<()> {
    use crate::config::example_config;

    tracing::debug!("Running init command with args: {:?}", args);

    let config_path = cli.root.join("chartbump.toml");

    if config_path.exists() && !args.force {
        return Err(ChartbumpError::WithContext {
            context: "init".to_string(),
            message: "Configuration file already exists. Use --force to overwrite.".to_string(),
        });
    }

    std::fs::write(&config_path, example_config())?;

    println!("✓ Created {}", config_path.display());

    Ok(())
}

//! changelint: surface static-analysis findings on changed lines.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use changelint::config;
use changelint::diff;
use changelint::env;
use changelint::github;
use changelint::index::PathNormalizer;
use changelint::models::InputMode;
use changelint::publish::{GitHubPublisher, Publisher, StdoutPublisher};
use changelint::report;
use changelint::runner::{self, RunContext, RunOptions};

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, OutputFormat};
use config::Config;
use env::Env;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let input_mode = cli.validate_input().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Resolve working directory and repository root
    let base_dir = std::fs::canonicalize(&cli.path)
        .with_context(|| format!("--path directory not found: {}", cli.path.display()))?;
    let repo_root = match diff::git::find_repo_root(&base_dir).await {
        Ok(root) => PathBuf::from(root),
        Err(e) => {
            tracing::debug!("{e}; using {} as the repository root", base_dir.display());
            base_dir.clone()
        }
    };

    let env = Env::real();
    let config = apply_cli(
        Config::load(Some(&repo_root), &env).context("failed to load configuration")?,
        &cli,
    );

    let workdir = match config.paths.workdir.clone() {
        Some(dir) => dir,
        None => diff::git::relative_workdir(&base_dir).await.unwrap_or_default(),
    };
    // Absolute report paths are relative to where the report was produced,
    // which the workdir offset then places in the repository.
    let normalizer = PathNormalizer::new()
        .with_strip(config.paths.strip)
        .with_workdir(&workdir)
        .with_root(base_dir.to_string_lossy());
    tracing::debug!(strip = normalizer.strip(), workdir = normalizer.workdir(), "path normalization");

    // Findings
    let report_path = base_dir.join(&config.report.path);
    let format = config.report.format.resolve(&report_path);
    let findings = report::load_report(&report_path, format)
        .await
        .context("failed to load analysis report")?;

    let mut ctx = RunContext::new(normalizer, config.review.tool_name.clone());

    let result = if input_mode == InputMode::GitHub {
        let Some(pr) = resolve_pull_request(&config, &env, &repo_root).await? else {
            eprintln!("{}", "This is not a pull request build.".dimmed());
            return Ok(());
        };
        let publisher: Box<dyn Publisher> = if cli.dry_run {
            Box::new(dry_run_publisher(cli.format))
        } else {
            Box::new(GitHubPublisher::new(pr.clone()))
        };
        let options = RunOptions {
            publisher: Some(publisher.as_ref()),
            skip_existing: config.review.skip_existing && !cli.dry_run,
        };
        runner::run(&mut ctx, &findings, &pr, options).await
    } else {
        let source = diff::LocalDiffSource::new(input_mode, &repo_root);
        let dry_run = cli.dry_run.then(|| dry_run_publisher(cli.format));
        let options = RunOptions {
            publisher: dry_run.as_ref().map(|p| p as &dyn Publisher),
            skip_existing: false,
        };
        runner::run(&mut ctx, &findings, &source, options).await
    };

    let report = result.context("review failed")?;
    print!("{}", cli.format.render(&report.surfaced));
    Ok(())
}

/// Layer CLI flags over the loaded config.
fn apply_cli(mut config: Config, cli: &Cli) -> Config {
    if let Some(ref path) = cli.report {
        config.report.path = path.to_string_lossy().into_owned();
    }
    if let Some(format) = cli.report_format {
        config.report.format = format;
    }
    if let Some(strip) = cli.strip {
        config.paths.strip = strip;
    }
    if let Some(ref workdir) = cli.workdir {
        config.paths.workdir = Some(workdir.clone());
    }
    if let Some(ref tool_name) = cli.tool_name {
        config.review.tool_name = tool_name.clone();
    }
    if cli.skip_existing {
        config.review.skip_existing = true;
    }
    if cli.no_git_fallback {
        config.github.fallback_to_git = false;
    }
    config
}

/// Dry-run comments go to stderr when stdout carries machine-readable output.
fn dry_run_publisher(format: OutputFormat) -> StdoutPublisher {
    match format {
        OutputFormat::Terminal => StdoutPublisher::new(),
        OutputFormat::Json | OutputFormat::Github => StdoutPublisher::with_writer(Box::new(std::io::stderr())),
    }
}

/// The pull request this build belongs to, or `None` for other builds.
async fn resolve_pull_request(config: &Config, env: &Env, repo_root: &Path) -> Result<Option<github::PullRequest>> {
    let info = github::BuildInfo::from_env(env).context("failed to read GitHub build info")?;
    let client = github::GitHubClient::new(&config.github)?;
    let Some(number) = github::pull_request::resolve_number(&client, &info)
        .await
        .context("failed to find the pull request")?
    else {
        return Ok(None);
    };
    tracing::info!("reviewing {}/{}#{number} at {}", info.owner, info.repo, info.sha);
    let pr = github::PullRequest::new(client, &info, number, repo_root)
        .with_git_fallback(config.github.fallback_to_git);
    Ok(Some(pr))
}

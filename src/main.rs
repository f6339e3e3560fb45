//! test-health-runner - test discovery and execution harness
//!
//! Locates test units under a root directory, runs each one in isolation
//! and reports pass/fail/error status.
//!
//! ## Features
//!
//! - Discovery from build-time generated test index files (no reflection)
//! - Sequential or bounded-parallel execution with per-unit timeouts
//! - Repeated rounds with flaky unit detection
//! - Table, summary and JSON output; JSON/CSV/text report export
//!
//! ## Usage
//!
//! ```bash
//! # Run everything under a root; exit code 0 only if all units pass
//! runner out/javatests
//!
//! # Small tests only, in parallel
//! runner out/javatests --size small --parallel
//!
//! # Run five rounds and report flaky units
//! runner out/javatests --repeat 5
//!
//! # List discovered units
//! runner out/javatests --list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod output;
mod report;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig, RunnerConfig};
use discovery::DiscoveryEngine;
use executor::{ExecutionRunner, ParallelExecutor, Registry};
use output::{write_report, ResultFormatter};
use report::{RepeatAggregate, RunSummary};
use utils::{init_logger, LogLevel, Stopwatch};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = if args.verbose || env.verbose.unwrap_or(false) {
        LogLevel::Debug
    } else {
        env.log_level.unwrap_or(LogLevel::Warn)
    };
    init_logger(level);

    match run(&args, &env).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Discover, execute and report; `Ok(true)` when every unit passed
async fn run(args: &Args, env: &EnvConfig) -> Result<bool> {
    let mut stopwatch = Stopwatch::new();
    let config = resolve_config(args, env)?;

    let mut formatter = ResultFormatter::new(config.output_format()?);
    if !config.color {
        formatter = formatter.no_color();
    }

    let mut engine = DiscoveryEngine::new().with_sizes(config.sizes.clone());
    if let Some(filter) = &config.filter {
        engine = engine.with_name_filter(filter.clone());
    }
    let discovery = engine.discover(&args.root)?;
    stopwatch.lap("discovery");

    if args.list {
        println!("{}", formatter.format_discovery(&discovery));
        return Ok(true);
    }

    if !discovery.disabled.is_empty() {
        info!("Skipping {} disabled units", discovery.disabled.len());
    }

    let registry = Registry::with_builtins();
    debug!("Builtins: {}", registry.names().join(", "));
    let runner = ExecutionRunner::new(registry)
        .with_timeout(config.timeout_ms.map(Duration::from_millis));

    let summaries = if config.parallel {
        ParallelExecutor::new(runner, config.max_concurrent)
            .run_rounds(&discovery.units, config.repeat)
            .await
    } else {
        runner.run_rounds(&discovery.units, config.repeat).await
    };
    stopwatch.lap("execution");

    for summary in &summaries {
        println!("{}", formatter.format_summary(summary));
    }
    if summaries.len() > 1 {
        let aggregate = RepeatAggregate::from_rounds(&summaries);
        println!("{}", formatter.format_aggregate(&aggregate));
    }

    if let Some(path) = &args.output {
        write_report(path, &summaries)?;
    }

    debug!("Timings: {}", stopwatch.format());
    Ok(summaries.iter().all(RunSummary::is_all_passed))
}

/// Layer config file, profile, environment and flags
fn resolve_config(args: &Args, env: &EnvConfig) -> Result<RunnerConfig> {
    let config_path = args.config.as_deref().or(env.config_file.as_deref());
    let file = ConfigFile::load_or_default(config_path)?;

    let mut config = file.runner.clone();
    if let Some(name) = args.profile.as_deref().or(env.profile.as_deref()) {
        let profile = file
            .profile(name)
            .with_context(|| format!("Unknown profile: {name}"))?;
        info!("Using profile '{}'", profile.name);
        config.apply_profile(&profile);
    }

    config.apply(&env.overrides()?);
    config.apply(&args.overrides());
    config.validate()?;

    Ok(config)
}

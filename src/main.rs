//! CLI entry point for the pfam-fusions tool.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pfam_fusions::pipeline::DEFAULT_SUBMIT_DELAY;
use pfam_fusions::{
    DEFAULT_PFAM_BASE_URL, DEFAULT_PUBSEED_BASE_URL, Endpoints, HttpFetcher, HttpTimeouts,
    PollSettings, Settings,
};
use tracing::{debug, info};

mod cli;
mod config;

use cli::Args;
use config::FileConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run_cli(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(args: Args) -> Result<()> {
    let file_config = config::load_config(args.config.as_deref())?.unwrap_or_default();

    let (default_level, force_cli_level) = log_level(&args, &file_config);
    init_tracing(default_level, force_cli_level);
    debug!(?args, "CLI arguments parsed");
    debug!(?file_config, "Configuration loaded");

    let (settings, timeouts) = build_settings(&args, &file_config)?;
    let fetcher = HttpFetcher::new(timeouts).context("Failed to create HTTP client")?;

    info!(input = %settings.input.display(), "pfam-fusions starting");
    let summary = pfam_fusions::run(&settings, Arc::new(fetcher)).await?;

    info!(
        records = summary.records,
        submitted = summary.submitted,
        rejected = summary.rejected,
        succeeded = summary.succeeded,
        failed = summary.failed,
        abandoned = summary.abandoned,
        families = summary.families,
        architectures = summary.architectures,
        members = summary.members,
        "Done"
    );
    Ok(())
}

/// Picks the default log level.
///
/// Priority: CLI flags > `RUST_LOG` > config `verbosity` > info. The flag is
/// true when the level came from the command line and must override `RUST_LOG`.
fn log_level(args: &Args, file_config: &FileConfig) -> (&'static str, bool) {
    if args.quiet {
        return ("error", true);
    }
    match args.verbose {
        0 => (
            file_config.verbosity.map_or("info", config::VerbositySetting::level),
            false,
        ),
        1 => ("debug", true),
        _ => ("trace", true),
    }
}

fn init_tracing(default_level: &str, force_cli_level: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Merges CLI flags over config-file values over built-in defaults.
fn build_settings(args: &Args, file_config: &FileConfig) -> Result<(Settings, HttpTimeouts)> {
    let pfam_url = args
        .pfam_url
        .as_deref()
        .or(file_config.pfam_url.as_deref())
        .unwrap_or(DEFAULT_PFAM_BASE_URL);
    let pubseed_url = args
        .pubseed_url
        .as_deref()
        .or(file_config.pubseed_url.as_deref())
        .unwrap_or(DEFAULT_PUBSEED_BASE_URL);
    let endpoints = Endpoints::new(pfam_url, pubseed_url).context("Invalid service URL")?;

    let poll = PollSettings {
        interval: args
            .poll_interval_ms
            .or(file_config.poll_interval_ms)
            .map_or(PollSettings::default().interval, Duration::from_millis),
        max_cycles: args.max_poll_cycles.or(file_config.max_poll_cycles),
    };

    let mut settings = Settings::new(args.input.clone(), args.summary.clone(), args.details.clone());
    settings.json.clone_from(&args.json);
    settings.endpoints = endpoints;
    settings.poll = poll;
    settings.submit_delay = args
        .submit_delay_ms
        .or(file_config.submit_delay_ms)
        .map_or(DEFAULT_SUBMIT_DELAY, Duration::from_millis);
    settings.miss_policy = args.on_miss.or(file_config.on_miss).unwrap_or_default();

    let defaults = HttpTimeouts::default();
    let timeouts = HttpTimeouts {
        connect_secs: file_config
            .connect_timeout_secs
            .unwrap_or(defaults.connect_secs),
        read_secs: args
            .timeout_secs
            .or(file_config.timeout_secs)
            .unwrap_or(defaults.read_secs),
    };
    Ok((settings, timeouts))
}

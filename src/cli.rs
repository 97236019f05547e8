//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pfam_fusions::MissPolicy;

/// Find the Pfam domain architectures (fusion events) of query proteins.
///
/// Each FASTA record is searched against Pfam; for every family it matches,
/// all multi-domain architectures that family takes part in are listed in the
/// summary report, with every member protein in the details report.
#[derive(Parser, Debug)]
#[command(name = "pfam-fusions")]
#[command(author, version, about)]
pub struct Args {
    /// FASTA file with the query protein sequences
    pub input: PathBuf,

    /// Summary report (one row per architecture)
    pub summary: PathBuf,

    /// Details report (one row per member protein)
    pub details: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/pfam-fusions/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pfam service root
    #[arg(long, value_name = "URL")]
    pub pfam_url: Option<String>,

    /// PubSEED service root
    #[arg(long, value_name = "URL")]
    pub pubseed_url: Option<String>,

    /// Pause before every polling cycle in milliseconds (default 3000, max 600000)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub poll_interval_ms: Option<u64>,

    /// Pause after every submission in milliseconds (default 2000, max 600000)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub submit_delay_ms: Option<u64>,

    /// Give up on jobs still pending after this many polling cycles (default: never)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_poll_cycles: Option<u32>,

    /// What to do when a page lacks expected data: ignore, warn or fail
    #[arg(long, value_name = "POLICY")]
    pub on_miss: Option<MissPolicy>,

    /// Also write the collected architectures as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Read timeout per request in seconds (default 600, max 3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout_secs: Option<u64>,
}

//! One end-to-end run: FASTA in, reports out.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::architecture::{ArchitectureCollector, CollectError, ExtractionMiss, MissPolicy};
use crate::endpoints::Endpoints;
use crate::fasta::{FastaError, read_fasta};
use crate::fetch::{FetchError, MarkupFetcher};
use crate::report::{ReportError, ReportWriter, write_json, write_report};
use crate::resolver::PubSeedResolver;
use crate::search::{JobTracker, PollSettings, SubmitOutcome};

/// Default pause after each submission.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_secs(2);

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    /// FASTA input file.
    pub input: PathBuf,
    /// Summary report path.
    pub summary: PathBuf,
    /// Details report path.
    pub details: PathBuf,
    /// Optional JSON dump path.
    pub json: Option<PathBuf>,
    /// Service roots.
    pub endpoints: Endpoints,
    /// Polling behavior.
    pub poll: PollSettings,
    /// Pause after each submission.
    pub submit_delay: Duration,
    /// How extraction misses are surfaced.
    pub miss_policy: MissPolicy,
}

impl Settings {
    /// Settings with default service roots and timings.
    #[must_use]
    pub fn new(input: PathBuf, summary: PathBuf, details: PathBuf) -> Self {
        Self {
            input,
            summary,
            details,
            json: None,
            endpoints: Endpoints::default(),
            poll: PollSettings::default(),
            submit_delay: DEFAULT_SUBMIT_DELAY,
            miss_policy: MissPolicy::default(),
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// FASTA records read.
    pub records: usize,
    /// Jobs accepted by the search service.
    pub submitted: usize,
    /// Submissions dropped for lack of a polling URL.
    pub rejected: usize,
    /// Jobs that returned results.
    pub succeeded: usize,
    /// Jobs the service reported dead.
    pub failed: usize,
    /// Jobs given up on.
    pub abandoned: usize,
    /// Distinct `(identifier, family)` pairs.
    pub families: usize,
    /// Architectures reported.
    pub architectures: usize,
    /// Member rows reported.
    pub members: usize,
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file is missing or malformed.
    #[error(transparent)]
    Fasta(#[from] FastaError),

    /// A remote exchange failed.
    #[error(transparent)]
    Transport(#[from] FetchError),

    /// An extraction miss under the `fail` policy.
    #[error("{0}\n  Suggestion: Rerun with --on-miss warn to keep partial results")]
    Extraction(ExtractionMiss),

    /// A report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<CollectError> for PipelineError {
    fn from(error: CollectError) -> Self {
        match error {
            CollectError::Transport(e) => Self::Transport(e),
            CollectError::Extraction(miss) => Self::Extraction(miss),
        }
    }
}

/// Runs the whole workflow.
///
/// Reports are written only after every remote exchange has completed, so a
/// fatal error leaves no report behind.
///
/// # Errors
///
/// Returns [`PipelineError`] for input, transport, extraction (under the
/// `fail` policy) and report failures.
#[instrument(skip_all, fields(input = %settings.input.display()))]
pub async fn run(
    settings: &Settings,
    fetcher: Arc<dyn MarkupFetcher>,
) -> Result<RunSummary, PipelineError> {
    let records = read_fasta(&settings.input)?;
    info!(records = records.len(), "Read FASTA input");

    let mut summary = RunSummary {
        records: records.len(),
        ..RunSummary::default()
    };
    let mut aliases = HashMap::new();
    let mut tracker = JobTracker::new(fetcher.clone(), settings.endpoints.clone(), settings.poll);

    for record in &records {
        debug!(identifier = %record.identifier, "Read FASTA record");
        aliases.insert(record.identifier.clone(), record.alias.clone());
        match tracker.submit(&record.identifier, &record.sequence).await? {
            SubmitOutcome::Submitted { .. } => summary.submitted += 1,
            SubmitOutcome::Rejected { .. } => summary.rejected += 1,
        }
        tokio::time::sleep(settings.submit_delay).await;
    }

    let drained = tracker.drain().await?;
    summary.succeeded = drained.succeeded;
    summary.failed = drained.failed;
    summary.abandoned = drained.abandoned;

    let matches = tracker.results();
    summary.families = matches
        .iter()
        .map(|m| (m.identifier.as_str(), m.family_id.as_str()))
        .collect::<HashSet<_>>()
        .len();

    let collector = ArchitectureCollector::new(
        fetcher.clone(),
        settings.endpoints.clone(),
        settings.miss_policy,
    );
    let architectures = collector.collect(&matches).await?;
    summary.architectures = architectures.len();
    summary.members = architectures.iter().map(|a| a.members.len()).sum();

    let resolver = PubSeedResolver::new(fetcher, settings.endpoints.clone());
    let writer = ReportWriter::new(&settings.endpoints, &aliases);
    let summary_text = writer.summary(&architectures, &resolver).await?;
    let details_text = writer.details(&architectures);

    write_report(&settings.summary, &summary_text).await?;
    write_report(&settings.details, &details_text).await?;
    if let Some(path) = &settings.json {
        write_json(path, &architectures).await?;
    }

    info!(
        architectures = summary.architectures,
        members = summary.members,
        "Run complete"
    );
    Ok(summary)
}

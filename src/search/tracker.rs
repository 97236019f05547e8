//! Job submission and the polling loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::endpoints::Endpoints;
use crate::fetch::{FetchError, MarkupFetcher};

use super::payload::{extract_matches, parse_result_url};
use super::{FamilyMatch, JobFailure, JobStatus, PollAction, SearchJob, classify_status};

/// Default pause between polling cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Polling behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep before every polling cycle.
    pub interval: Duration,
    /// Optional cap on polling cycles. `None` polls until every job is terminal.
    pub max_cycles: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_cycles: None,
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A polling URL was issued and the job is tracked.
    Submitted {
        /// Polling URL for the new job.
        submission_url: String,
    },
    /// The service answered without a usable polling URL; the identifier was dropped.
    Rejected {
        /// HTTP status of the rejected submission.
        status: u16,
    },
}

/// Summary of a `drain` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Polling cycles run.
    pub cycles: u32,
    /// Active-set size when draining started.
    pub initial_active: usize,
    /// Active-set size at the end of every cycle.
    pub active_after_cycle: Vec<usize>,
    /// Jobs that returned results.
    pub succeeded: usize,
    /// Jobs the service reported dead.
    pub failed: usize,
    /// Jobs given up on (unhandled code or poll cap).
    pub abandoned: usize,
}

/// Owns every search job for one run.
///
/// Contract: [`submit`](Self::submit) each sequence, [`drain`](Self::drain)
/// once, then read [`results`](Self::results).
pub struct JobTracker {
    fetcher: Arc<dyn MarkupFetcher>,
    endpoints: Endpoints,
    settings: PollSettings,
    active: Vec<SearchJob>,
    finished: Vec<SearchJob>,
    matches: Vec<(usize, Vec<FamilyMatch>)>,
    submitted: usize,
}

impl std::fmt::Debug for JobTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTracker")
            .field("settings", &self.settings)
            .field("active", &self.active.len())
            .field("finished", &self.finished.len())
            .finish_non_exhaustive()
    }
}

impl JobTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn MarkupFetcher>,
        endpoints: Endpoints,
        settings: PollSettings,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            settings,
            active: Vec::new(),
            finished: Vec::new(),
            matches: Vec::new(),
            submitted: 0,
        }
    }

    /// Jobs still waiting for a terminal status, in submission order.
    #[must_use]
    pub fn active(&self) -> &[SearchJob] {
        &self.active
    }

    /// Jobs that reached a terminal status, in the order they finished.
    #[must_use]
    pub fn finished(&self) -> &[SearchJob] {
        &self.finished
    }

    /// Submits one sequence for search.
    ///
    /// A response without a polling URL drops the identifier: nothing is
    /// tracked for it. Resubmitting an identifier that is still active
    /// replaces the earlier job.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure.
    #[instrument(skip(self, sequence), fields(residues = sequence.len()))]
    pub async fn submit(
        &mut self,
        identifier: &str,
        sequence: &str,
    ) -> Result<SubmitOutcome, FetchError> {
        info!(identifier, "Submitting sequence for search");
        let response = self
            .fetcher
            .post_form(
                &self.endpoints.search_url(),
                &[("seq", sequence), ("output", "xml")],
            )
            .await?;

        let Some(raw_url) = parse_result_url(&response.body) else {
            warn!(
                identifier,
                status = response.status,
                "Search server did not accept the sequence; try this sequence again later"
            );
            return Ok(SubmitOutcome::Rejected {
                status: response.status,
            });
        };

        let submission_url = match self.endpoints.absolutize(&raw_url) {
            Ok(url) => url,
            Err(error) => {
                warn!(identifier, %error, "Search server returned an unusable polling URL");
                return Ok(SubmitOutcome::Rejected {
                    status: response.status,
                });
            }
        };

        if let Some(position) = self.active.iter().position(|j| j.identifier == identifier) {
            warn!(identifier, "Identifier resubmitted; replacing the earlier job");
            self.active.remove(position);
        }

        debug!(identifier, url = %submission_url, "Search job accepted");
        self.active.push(SearchJob::pending(
            identifier,
            submission_url.clone(),
            self.submitted,
        ));
        self.submitted += 1;
        Ok(SubmitOutcome::Submitted { submission_url })
    }

    /// Polls every active job until the active set is empty.
    ///
    /// Each cycle sleeps the configured interval, then checks every active job
    /// once in submission order. With `max_cycles` set, jobs still pending when
    /// the cap is reached are abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure; the active set is left as
    /// it was at the failing job.
    pub async fn drain(&mut self) -> Result<DrainReport, FetchError> {
        let mut report = DrainReport {
            initial_active: self.active.len(),
            ..DrainReport::default()
        };

        while !self.active.is_empty() {
            if let Some(max_cycles) = self.settings.max_cycles
                && report.cycles >= max_cycles
            {
                self.abandon_remaining(&mut report);
                break;
            }

            tokio::time::sleep(self.settings.interval).await;
            report.cycles += 1;

            let mut index = 0;
            while index < self.active.len() {
                let status = self.poll(index).await?;
                if status.is_terminal() {
                    let mut job = self.active.remove(index);
                    job.status = status;
                    report.record(status);
                    self.finished.push(job);
                } else {
                    index += 1;
                }
            }
            report.active_after_cycle.push(self.active.len());
        }

        info!(
            cycles = report.cycles,
            succeeded = report.succeeded,
            failed = report.failed,
            abandoned = report.abandoned,
            "All search jobs resolved"
        );
        Ok(report)
    }

    /// Family matches in identifier submission order, then payload order.
    #[must_use]
    pub fn results(&self) -> Vec<FamilyMatch> {
        let mut ordered: Vec<_> = self.matches.iter().collect();
        ordered.sort_by_key(|(order, _)| *order);
        ordered
            .into_iter()
            .flat_map(|(_, matches)| matches.iter().cloned())
            .collect()
    }

    async fn poll(&mut self, index: usize) -> Result<JobStatus, FetchError> {
        let job = &self.active[index];
        let identifier = job.identifier.clone();
        info!(identifier, "Checking job status");
        let response = self.fetcher.get(&job.submission_url).await?;

        let status = match classify_status(response.status) {
            PollAction::Ready => {
                debug!(identifier, "Received results");
                let matches = match extract_matches(&identifier, &response.body) {
                    Ok(matches) => matches,
                    Err(error) => {
                        warn!(identifier, %error, "Could not read search results; no families recorded");
                        Vec::new()
                    }
                };
                for m in &matches {
                    debug!(identifier, family = %m.family_id, "Found Pfam family");
                }
                self.matches.push((self.active[index].order, matches));
                JobStatus::Succeeded
            }
            PollAction::Processing => {
                info!(identifier, "Still waiting on results");
                JobStatus::Pending
            }
            PollAction::Failed(JobFailure::UpstreamFailure) => {
                info!(identifier, "The job failed on the search system side; resubmit it later");
                JobStatus::Failed
            }
            PollAction::Failed(JobFailure::Held) => {
                info!(
                    identifier,
                    status = response.status,
                    "The job was put on hold by the server admins; wait and resubmit it later"
                );
                JobStatus::Failed
            }
            PollAction::Failed(JobFailure::Withdrawn) => {
                info!(
                    identifier,
                    "The job was deleted from the search system by the server admins; contact the help desk or resubmit it later"
                );
                JobStatus::Failed
            }
            PollAction::Unhandled(code) => {
                warn!(identifier, status = code, "Unexpected status code; skipping this sequence");
                JobStatus::Abandoned
            }
        };
        Ok(status)
    }

    fn abandon_remaining(&mut self, report: &mut DrainReport) {
        for mut job in self.active.drain(..) {
            warn!(
                identifier = %job.identifier,
                cycles = report.cycles,
                "Poll cap reached before the job finished; abandoning it"
            );
            job.status = JobStatus::Abandoned;
            report.record(JobStatus::Abandoned);
            self.finished.push(job);
        }
    }
}

impl DrainReport {
    fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Succeeded => self.succeeded += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Abandoned => self.abandoned += 1,
            JobStatus::Pending => {}
        }
    }
}

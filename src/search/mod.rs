//! Sequence search orchestration against the Pfam search service.
//!
//! # Architecture
//!
//! - [`JobTracker`] - Owns in-flight jobs: `submit`, `drain`, `results`
//! - [`SearchJob`] / [`JobStatus`] - Per-job state machine
//! - [`PollAction`] / [`classify_status`] - Status-code policy for polling
//! - [`payload`] - XML extraction for acknowledgements, results and families
//!
//! A job moves from `Pending` to exactly one terminal status and is then
//! removed from the active set for good.

pub mod payload;
mod tracker;

pub use payload::{PayloadError, extract_matches};
pub use tracker::{DrainReport, JobTracker, PollSettings, SubmitOutcome};

use std::fmt;

/// State of one search job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Submitted, waiting for results.
    Pending,
    /// Results received and extracted.
    Succeeded,
    /// Upstream reported the job dead (502, 500, 503, 401).
    Failed,
    /// Unrecognized status code, or the optional poll cap was reached.
    Abandoned,
}

impl JobStatus {
    /// Returns true for statuses that remove the job from the active set.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One tracked search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchJob {
    /// Identifier of the submitted sequence.
    pub identifier: String,
    /// Polling URL handed back by the search service on submission.
    pub submission_url: String,
    /// Current status.
    pub status: JobStatus,
    order: usize,
}

impl SearchJob {
    fn pending(identifier: &str, submission_url: String, order: usize) -> Self {
        Self {
            identifier: identifier.to_string(),
            submission_url,
            status: JobStatus::Pending,
            order,
        }
    }
}

/// A family a sequence matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FamilyMatch {
    /// Identifier of the searched sequence.
    pub identifier: String,
    /// Pfam family accession.
    pub family_id: String,
}

/// Why the search service gave up on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFailure {
    /// 502: the job failed on the search system side.
    UpstreamFailure,
    /// 500 or 503: the job was put on hold by the service admins.
    Held,
    /// 401: the job was deleted by the service admins.
    Withdrawn,
}

/// What a polling status code means for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    /// 200: results are ready.
    Ready,
    /// 202: still running.
    Processing,
    /// Known terminal failure code.
    Failed(JobFailure),
    /// Any other code; the job is abandoned.
    Unhandled(u16),
}

/// Maps a polling response status code to the action taken for the job.
#[must_use]
pub fn classify_status(status: u16) -> PollAction {
    match status {
        200 => PollAction::Ready,
        202 => PollAction::Processing,
        502 => PollAction::Failed(JobFailure::UpstreamFailure),
        500 | 503 => PollAction::Failed(JobFailure::Held),
        401 => PollAction::Failed(JobFailure::Withdrawn),
        other => PollAction::Unhandled(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_table() {
        assert_eq!(classify_status(200), PollAction::Ready);
        assert_eq!(classify_status(202), PollAction::Processing);
        assert_eq!(
            classify_status(502),
            PollAction::Failed(JobFailure::UpstreamFailure)
        );
        assert_eq!(classify_status(500), PollAction::Failed(JobFailure::Held));
        assert_eq!(classify_status(503), PollAction::Failed(JobFailure::Held));
        assert_eq!(
            classify_status(401),
            PollAction::Failed(JobFailure::Withdrawn)
        );
        assert_eq!(classify_status(404), PollAction::Unhandled(404));
        assert_eq!(classify_status(201), PollAction::Unhandled(201));
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Abandoned.is_terminal());
    }

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Abandoned.to_string(), "abandoned");
    }
}

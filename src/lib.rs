//! Pfam Fusions Core Library
//!
//! Drives the Pfam sequence search for a set of query proteins and collects
//! the multi-domain architectures (fusion events) of every matched family.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fasta`] - FASTA input reading
//! - [`fetch`] - HTTP exchanges behind the [`MarkupFetcher`] trait
//! - [`search`] - Search job submission, polling and result extraction
//! - [`architecture`] - Listing and detail page extraction per family
//! - [`resolver`] - PubSEED FIG id lookup for representative proteins
//! - [`report`] - Summary and details reports
//! - [`pipeline`] - One end-to-end run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod architecture;
pub mod endpoints;
pub mod fasta;
pub mod fetch;
mod markup;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod search;
#[cfg(test)]
mod test_support;
mod user_agent;

// Re-export commonly used types
pub use architecture::{Architecture, ArchitectureCollector, ExtractionMiss, Member, MissPolicy};
pub use endpoints::{DEFAULT_PFAM_BASE_URL, DEFAULT_PUBSEED_BASE_URL, Endpoints};
pub use fasta::{FastaError, FastaRecord, read_fasta};
pub use fetch::{FetchError, HttpFetcher, HttpTimeouts, MarkupFetcher};
pub use pipeline::{PipelineError, RunSummary, Settings, run};
pub use resolver::{FigMatch, IdentifierResolver, PubSeedResolver};
pub use search::{FamilyMatch, JobStatus, JobTracker, PollSettings};

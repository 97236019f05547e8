//! Per-family fetch and correlation of architectures and their members.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use super::listing::ListingPage;
use super::member::{detail_blocks, parse_member};
use super::{Architecture, ExtractionMiss, Member, MissPolicy};
use crate::endpoints::Endpoints;
use crate::fetch::{FetchError, MarkupFetcher, fetch_markup};
use crate::search::FamilyMatch;
use crate::search::payload::parse_family_name;

/// Errors that stop architecture collection.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A page could not be fetched.
    #[error(transparent)]
    Transport(#[from] FetchError),

    /// An extraction miss under [`MissPolicy::Fail`].
    #[error("{0}\n  Suggestion: Rerun with --on-miss warn to keep partial results")]
    Extraction(#[from] ExtractionMiss),
}

/// Builds [`Architecture`] records for family matches.
pub struct ArchitectureCollector {
    fetcher: Arc<dyn MarkupFetcher>,
    endpoints: Endpoints,
    policy: MissPolicy,
}

impl std::fmt::Debug for ArchitectureCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchitectureCollector")
            .field("endpoints", &self.endpoints)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ArchitectureCollector {
    /// Creates a collector.
    #[must_use]
    pub fn new(fetcher: Arc<dyn MarkupFetcher>, endpoints: Endpoints, policy: MissPolicy) -> Self {
        Self {
            fetcher,
            endpoints,
            policy,
        }
    }

    /// Collects architectures for every distinct `(identifier, family)` pair,
    /// in match order, then row order within each listing.
    ///
    /// # Errors
    ///
    /// [`CollectError::Transport`] on any failed fetch;
    /// [`CollectError::Extraction`] for a miss under [`MissPolicy::Fail`].
    pub async fn collect(&self, matches: &[FamilyMatch]) -> Result<Vec<Architecture>, CollectError> {
        let mut seen = HashSet::new();
        let mut architectures = Vec::new();

        for m in matches {
            if !seen.insert((m.identifier.as_str(), m.family_id.as_str())) {
                debug!(identifier = %m.identifier, family = %m.family_id, "Family already processed");
                continue;
            }
            let found = self.collect_family(&m.identifier, &m.family_id).await?;
            architectures.extend(found);
        }

        info!(
            pairs = seen.len(),
            architectures = architectures.len(),
            "Architecture collection finished"
        );
        Ok(architectures)
    }

    #[instrument(skip(self))]
    async fn collect_family(
        &self,
        identifier: &str,
        family_id: &str,
    ) -> Result<Vec<Architecture>, CollectError> {
        info!("Processing Pfam family");
        let family_name = self.family_name(family_id).await?;

        debug!("Requesting architectures");
        let listing = fetch_markup(self.fetcher.as_ref(), &self.endpoints.listing_url(family_id)).await?;
        let page = ListingPage::parse(&listing);

        let mut architectures = Vec::new();
        for row in page.rows() {
            let row = match row {
                Ok(row) => row,
                Err(miss) => {
                    self.policy.handle(miss.clone())?;
                    continue;
                }
            };
            if !row.qualifies() {
                debug!(primary_id = %row.primary_id, "Single-domain architecture skipped");
                continue;
            }

            let accessor = match page.accessor_for(&row.primary_id) {
                Ok(accessor) => Some(accessor),
                Err(miss) => {
                    self.policy.handle(miss)?;
                    None
                }
            };
            debug!(primary_id = %row.primary_id, ?accessor, "Adding architecture");
            architectures.push(Architecture {
                identifier: identifier.to_string(),
                family_id: family_id.to_string(),
                family_name: family_name.clone(),
                primary_id: row.primary_id.clone(),
                description: row.description.clone(),
                accessor,
                members: Vec::new(),
            });
        }

        for architecture in &mut architectures {
            if let Some(accessor) = architecture.accessor.as_deref() {
                architecture.members = self.members(family_id, accessor).await?;
            }
        }
        Ok(architectures)
    }

    async fn family_name(&self, family_id: &str) -> Result<String, CollectError> {
        debug!(family = family_id, "Retrieving family name");
        let xml = fetch_markup(self.fetcher.as_ref(), &self.endpoints.family_url(family_id)).await?;

        match parse_family_name(&xml) {
            Ok(Some(name)) => return Ok(name),
            Ok(None) => {}
            Err(error) => debug!(family = family_id, %error, "Unreadable family document"),
        }
        self.policy.handle(ExtractionMiss::FamilyName {
            family_id: family_id.to_string(),
        })?;
        Ok(family_id.to_string())
    }

    async fn members(&self, family_id: &str, accessor: &str) -> Result<Vec<Member>, CollectError> {
        debug!(accessor, "Requesting architecture details, this may take some time");
        let html = fetch_markup(
            self.fetcher.as_ref(),
            &self.endpoints.detail_url(family_id, accessor),
        )
        .await?;

        let blocks = detail_blocks(&html);
        if blocks.is_empty() {
            self.policy.handle(ExtractionMiss::MemberBlocksMissing {
                accessor: accessor.to_string(),
            })?;
        }

        let mut members = Vec::new();
        for block in blocks {
            match parse_member(&block) {
                Ok(member) => members.push(member),
                Err(miss) => self.policy.handle(miss)?,
            }
        }
        Ok(members)
    }
}

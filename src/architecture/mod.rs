//! Architecture extraction for matched Pfam families.
//!
//! # Architecture
//!
//! - [`ArchitectureCollector`] - Fetches name, listing and detail pages per family
//! - [`listing`] - Row and script-accessor extraction from the graphics listing
//! - [`member`] - Member block extraction from the zoomed detail view
//! - [`MissPolicy`] - How recoverable extraction misses are surfaced
//!
//! Listing and detail pages are semi-structured: data lives in headings, free
//! text and an inline script. Every delimiter the parsers rely on is checked,
//! and a missing one becomes an [`ExtractionMiss`] instead of a panic.

mod collector;
pub mod listing;
pub mod member;

pub use collector::{ArchitectureCollector, CollectError};
pub use listing::{ListingPage, ListingRow};
pub use member::{detail_blocks, parse_member};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Label that introduces the domain list in a row heading.
pub const ARCHITECTURE_LABEL: &str = "architecture:";

/// One protein carrying an architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Protein accession.
    pub protein_id: String,
    /// Source organism.
    pub organism_name: String,
    /// Annotated function.
    pub function: String,
    /// Sequence length in residues.
    pub length: u32,
}

/// A multi-domain fusion pattern a family takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Architecture {
    /// Identifier of the searched sequence.
    pub identifier: String,
    /// Pfam family accession.
    pub family_id: String,
    /// Pfam family display name.
    pub family_name: String,
    /// Representative protein from the listing row.
    pub primary_id: String,
    /// Row heading, whitespace-collapsed.
    pub description: String,
    /// Token selecting this architecture's detail view, when found.
    pub accessor: Option<String>,
    /// Proteins listed in the detail view, in page order.
    pub members: Vec<Member>,
}

impl Architecture {
    /// Text after the `architecture:` label, trimmed.
    #[must_use]
    pub fn architecture_name(&self) -> &str {
        self.description
            .split_once(ARCHITECTURE_LABEL)
            .map_or("", |(_, name)| name.trim())
    }

    /// Domain names of the architecture, in order.
    #[must_use]
    pub fn domains(&self) -> Vec<&str> {
        let name = self.architecture_name();
        if name.is_empty() {
            return Vec::new();
        }
        name.split(',').map(str::trim).collect()
    }

    /// Number of sequences with this architecture, as printed in the heading
    /// ("There is 1 sequence ..." / "There are 24 sequences ...").
    #[must_use]
    pub fn sequence_count(&self) -> Option<&str> {
        ["There is", "There are"].iter().find_map(|marker| {
            self.description
                .split_once(*marker)
                .and_then(|(_, rest)| rest.split_whitespace().next())
        })
    }

    /// Member protein ids in page order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.protein_id.clone()).collect()
    }
}

/// A recoverable gap in semi-structured upstream markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionMiss {
    /// The family document carried no readable name.
    #[error("no family name found for '{family_id}'")]
    FamilyName {
        /// Family accession.
        family_id: String,
    },

    /// A listing row has no heading, or its heading lacks the label.
    #[error("row '{primary_id}' has no 'architecture:' heading")]
    RowHeading {
        /// Row protein id.
        primary_id: String,
    },

    /// The row id never appears in the listing script.
    #[error("no script reference for row '{primary_id}'; architecture kept without members")]
    AccessorNotFound {
        /// Row protein id.
        primary_id: String,
    },

    /// The row id appears but the following line carries no accessor token.
    #[error("script line after row '{primary_id}' has no accessor token; architecture kept without members")]
    AccessorMalformed {
        /// Row protein id.
        primary_id: String,
    },

    /// The detail page has no member blocks at all.
    #[error("detail page for accessor '{accessor}' has no member blocks")]
    MemberBlocksMissing {
        /// Accessor of the architecture.
        accessor: String,
    },

    /// A member block does not follow `ID [organism] function (N residues)`.
    #[error("malformed member block '{text}': {reason}")]
    MemberBlock {
        /// The collapsed block text.
        text: String,
        /// Which delimiter contract failed.
        reason: &'static str,
    },
}

/// How extraction misses are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Keep partial data, log at debug level.
    #[default]
    Ignore,
    /// Keep partial data, log a warning.
    Warn,
    /// Stop the run with an error.
    Fail,
}

impl MissPolicy {
    /// Applies the policy to one miss.
    ///
    /// # Errors
    ///
    /// Returns the miss itself under [`MissPolicy::Fail`].
    pub fn handle(self, miss: ExtractionMiss) -> Result<(), ExtractionMiss> {
        match self {
            Self::Ignore => {
                debug!(%miss, "Extraction miss");
                Ok(())
            }
            Self::Warn => {
                warn!(%miss, "Extraction miss");
                Ok(())
            }
            Self::Fail => Err(miss),
        }
    }

    /// Returns the stable label used on the command line and in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for MissPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown miss policy '{other}'; expected one of: ignore, warn, fail"
            )),
        }
    }
}

/// Collapses every whitespace run to one space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Cross-reference lookup for representative proteins.
//!
//! - [`IdentifierResolver`] - Async trait: ordered aliases in, first hit out
//! - [`PubSeedResolver`] - PubSEED search-form implementation
//! - [`FigMatch`] - The alias that resolved and its FIG id

mod pubseed;

pub use pubseed::{PubSeedResolver, find_fig_id, search_pattern};

use async_trait::async_trait;

use crate::fetch::FetchError;

/// A resolved cross-reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigMatch {
    /// The candidate alias that produced a hit.
    pub alias: String,
    /// The external FIG identifier.
    pub fig_id: String,
}

/// Finds an external identifier for the first resolvable alias.
///
/// Uses `async_trait` so the report writer can hold a `&dyn IdentifierResolver`
/// and tests can substitute fixed answers.
#[async_trait]
pub trait IdentifierResolver: Send + Sync {
    /// Tries `candidates` in order and stops at the first hit.
    ///
    /// Returns `Ok(None)` when nothing resolves, including for an empty list.
    ///
    /// # Errors
    ///
    /// Any transport failure is returned immediately; later candidates are
    /// not tried.
    async fn resolve(&self, candidates: &[String]) -> Result<Option<FigMatch>, FetchError>;
}

//! PubSEED search-form resolver.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use super::{FigMatch, IdentifierResolver};
use crate::endpoints::Endpoints;
use crate::fetch::{FetchError, MarkupFetcher};
use crate::markup::{compile_static_selector, element_text};

static TABLE_DATA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"input[id="table_data_0"]"#));
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));

/// Resolves aliases through the PubSEED "Find" form.
pub struct PubSeedResolver {
    fetcher: Arc<dyn MarkupFetcher>,
    endpoints: Endpoints,
}

impl std::fmt::Debug for PubSeedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSeedResolver")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl PubSeedResolver {
    /// Creates a resolver posting to the configured PubSEED root.
    #[must_use]
    pub fn new(fetcher: Arc<dyn MarkupFetcher>, endpoints: Endpoints) -> Self {
        Self {
            fetcher,
            endpoints,
        }
    }

    async fn lookup(&self, pattern: &str) -> Result<Option<String>, FetchError> {
        let url = self.endpoints.pubseed_search_url();
        let response = self
            .fetcher
            .post_form(
                &url,
                &[
                    ("act", "do_search"),
                    ("page", "Find"),
                    ("pattern", pattern),
                    ("submit", "Search"),
                ],
            )
            .await?;
        if !response.is_success() {
            return Err(FetchError::http_status(url, response.status));
        }
        Ok(find_fig_id(&response.body))
    }
}

#[async_trait]
impl IdentifierResolver for PubSeedResolver {
    #[instrument(level = "debug", skip(self, candidates), fields(candidates = candidates.len()))]
    async fn resolve(&self, candidates: &[String]) -> Result<Option<FigMatch>, FetchError> {
        for alias in candidates {
            let pattern = search_pattern(alias);
            if pattern.is_empty() {
                debug!(alias = %alias, "Alias has no searchable prefix");
                continue;
            }
            debug!(alias = %alias, pattern, "Looking for FIG id");
            if let Some(fig_id) = self.lookup(pattern).await? {
                debug!(alias = %alias, fig_id = %fig_id, "Found FIG id");
                return Ok(Some(FigMatch {
                    alias: alias.clone(),
                    fig_id,
                }));
            }
        }
        Ok(None)
    }
}

/// The part of an alias PubSEED is searched with: everything before the
/// first `_`, so `Q04CD7_LACDA` searches for `Q04CD7`.
#[must_use]
pub fn search_pattern(alias: &str) -> &str {
    alias.split('_').next().unwrap_or_default().trim()
}

/// Extracts the FIG id from a PubSEED search result page.
///
/// The first result row lives HTML-encoded in the `value` of
/// `input#table_data_0`; the id is the text of its first link.
#[must_use]
pub fn find_fig_id(html: &str) -> Option<String> {
    let fragment = {
        let document = Html::parse_document(html);
        document
            .select(&TABLE_DATA_SELECTOR)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)?
    };
    let fragment = Html::parse_fragment(&fragment);
    fragment
        .select(&LINK_SELECTOR)
        .next()
        .map(element_text)
        .filter(|fig_id| !fig_id.is_empty())
}

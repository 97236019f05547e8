//! URL construction for the Pfam and PubSEED services.

use url::Url;

use crate::fetch::FetchError;

/// Default Pfam web service root.
pub const DEFAULT_PFAM_BASE_URL: &str = "http://pfam.xfam.org";

/// Default PubSEED root (search form and annotation pages).
pub const DEFAULT_PUBSEED_BASE_URL: &str = "http://pubseed.theseed.org";

/// Validated service roots and the URLs derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pfam_base: Url,
    pubseed_base: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        // The defaults are static, known-good URLs.
        #[allow(clippy::expect_used)]
        Self::new(DEFAULT_PFAM_BASE_URL, DEFAULT_PUBSEED_BASE_URL)
            .expect("default endpoints are valid URLs")
    }
}

impl Endpoints {
    /// Creates endpoints from two service roots.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when a root is not an absolute
    /// `http`/`https` URL.
    pub fn new(pfam_base: &str, pubseed_base: &str) -> Result<Self, FetchError> {
        Ok(Self {
            pfam_base: parse_base(pfam_base)?,
            pubseed_base: parse_base(pubseed_base)?,
        })
    }

    /// Sequence search submission endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        with_segments(&self.pfam_base, &["search", "sequence"]).to_string()
    }

    /// Family detail document (XML).
    #[must_use]
    pub fn family_url(&self, family_id: &str) -> String {
        let mut url = with_segments(&self.pfam_base, &["family", family_id]);
        url.query_pairs_mut().append_pair("output", "xml");
        url.to_string()
    }

    /// Architecture-graphics listing for a family.
    #[must_use]
    pub fn listing_url(&self, family_id: &str) -> String {
        with_segments(&self.pfam_base, &["domaingraphics", family_id]).to_string()
    }

    /// Zoomed listing for one architecture accessor.
    #[must_use]
    pub fn detail_url(&self, family_id: &str, accessor: &str) -> String {
        let mut url = with_segments(&self.pfam_base, &["domaingraphics", family_id]);
        url.query_pairs_mut().append_pair("arch", accessor);
        url.to_string()
    }

    /// Public protein page, used in report hyperlinks.
    #[must_use]
    pub fn protein_url(&self, protein_id: &str) -> String {
        with_segments(&self.pfam_base, &["protein", protein_id]).to_string()
    }

    /// PubSEED search form endpoint.
    #[must_use]
    pub fn pubseed_search_url(&self) -> String {
        self.pubseed_base.to_string()
    }

    /// PubSEED annotation page for a FIG id, used in report hyperlinks.
    ///
    /// The FIG id is inserted verbatim (`fig|83333.1.peg.4`).
    #[must_use]
    pub fn annotation_url(&self, fig_id: &str) -> String {
        let mut url = self.pubseed_base.clone();
        url.set_query(None);
        format!("{url}?page=Annotation&feature={fig_id}")
    }

    /// Absolutizes a polling URL returned by the search service.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when the value cannot be joined.
    pub fn absolutize(&self, value: &str) -> Result<String, FetchError> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            return Ok(value.to_string());
        }
        self.pfam_base
            .join(value)
            .map(|url| url.to_string())
            .map_err(|e| FetchError::invalid_url(value, e.to_string()))
    }
}

fn parse_base(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::invalid_url(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(
            raw,
            format!("scheme '{}' is not supported", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(FetchError::invalid_url(raw, "URL cannot be used as a base"));
    }
    Ok(url)
}

fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

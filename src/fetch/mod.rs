//! Markup fetching: one request/response exchange per call.
//!
//! - [`MarkupFetcher`] - Async trait every higher component talks through
//! - [`HttpFetcher`] - `reqwest` implementation used by the binary
//! - [`FetchResponse`] - Status code plus raw body text
//!
//! Non-2xx statuses are *not* errors at the trait level: the job tracker uses
//! the status code as its only job-state signal. Content fetches go through
//! [`fetch_markup`], which treats a non-2xx answer as fatal.

mod error;
mod http_client;

pub use error::FetchError;
pub use http_client::{
    ACCEPT_MARKUP, CONNECT_TIMEOUT_SECS, HttpTimeouts, READ_TIMEOUT_SECS, build_http_client,
};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

/// Raw result of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Creates a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs single request/response exchanges.
///
/// # Object Safety
///
/// Uses `async_trait` so callers can share one `Arc<dyn MarkupFetcher>`
/// and tests can substitute a scripted transport.
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    /// Issues a GET and returns status and body.
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Issues a form-encoded POST and returns status and body.
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<FetchResponse, FetchError>;
}

/// Fetches a document whose content is required, treating any non-2xx
/// status as fatal.
///
/// # Errors
///
/// Returns [`FetchError`] on transport failure or a non-success status.
pub async fn fetch_markup(fetcher: &dyn MarkupFetcher, url: &str) -> Result<String, FetchError> {
    let response = fetcher.get(url).await?;
    if !response.is_success() {
        return Err(FetchError::http_status(url, response.status));
    }
    Ok(response.body)
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(timeouts)?,
        })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<FetchResponse, FetchError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::body(url, e))?;
        debug!(url, status, bytes = body.len(), "Received response");
        Ok(FetchResponse { status, body })
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_request(url, e))?;
        Self::read(url, response).await
    }

    #[instrument(level = "debug", skip(self, fields))]
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<FetchResponse, FetchError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| FetchError::from_request(url, e))?;
        Self::read(url, response).await
    }
}

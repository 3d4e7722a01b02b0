//! Crossref metadata client.
//!
//! Thin wrapper over the Crossref REST API:
//! - [`CrossrefClient::fetch_work`] — `GET /works/{doi}` for one work record
//! - [`CrossrefClient::search_works`] — `GET /works?query.*` field search
//!
//! Every request carries the polite User-Agent (embedding a contact mailto,
//! per Crossref etiquette) and `Accept: application/json`. Search keys are
//! restricted to an allow-list ([`ALLOWED_QUERY_KEYS`]); an unknown key is a
//! typed validation error returned before any network call.
//!
//! The [`MetadataProvider`] trait is the seam the resolution pipeline depends
//! on, so tests substitute deterministic fixtures for live HTTP.

mod error;
mod query;
mod types;

pub use error::ClientError;
pub use query::{ALLOWED_QUERY_KEYS, SearchQuery};
pub use types::{
    ContributorName, RawReference, SearchItem, SearchMessage, SearchResponse, WorkMessage,
    WorkResponse,
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::user_agent::polite_user_agent;

/// Default Crossref API base URL.
const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

/// Worker label used when no label was supplied (single-worker operation).
const DEFAULT_WORKER_LABEL: &str = "+";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Capability trait for bibliographic metadata lookups.
///
/// Implemented by [`CrossrefClient`] for live traffic and by test doubles in
/// the pipeline test suite.
///
/// # Object Safety
///
/// Uses `async_trait` so the pipeline can hold `dyn MetadataProvider` when
/// dynamic dispatch is preferred over generics.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches the work record for a single identifier.
    async fn fetch_work(&self, identifier: &str) -> Result<WorkMessage, ClientError>;

    /// Runs a field search and returns the result candidates.
    async fn search_works(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, ClientError>;
}

/// Crossref REST API client.
///
/// Holds one reqwest client for the process lifetime. The worker label is
/// carried on log lines only, reserved for future multi-worker attribution;
/// it has no behavioral effect.
pub struct CrossrefClient {
    client: Client,
    base_url: String,
    worker: String,
}

impl CrossrefClient {
    /// Creates a client for the public Crossref API.
    ///
    /// # Arguments
    ///
    /// * `mailto` - contact address embedded in the User-Agent, per API etiquette
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidMailto`] for control characters in the
    /// address, or [`ClientError::Build`] if client construction fails.
    pub fn new(mailto: impl Into<String>) -> Result<Self, ClientError> {
        Self::build(mailto.into(), DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`CrossrefClient::new`].
    pub fn with_base_url(
        mailto: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::build(mailto.into(), base_url.into())
    }

    /// Sets the worker label used for log-line attribution.
    #[must_use]
    pub fn with_worker_label(mut self, label: impl Into<String>) -> Self {
        self.worker = label.into();
        self
    }

    fn build(mailto: String, base_url: String) -> Result<Self, ClientError> {
        if mailto.chars().any(|c| c == '\n' || c == '\r' || c == '\0') {
            return Err(ClientError::InvalidMailto(mailto));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(polite_user_agent(&mailto))
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            worker: DEFAULT_WORKER_LABEL.to_string(),
        })
    }

    /// Builds the URL for the single-work endpoint.
    fn works_url(&self, identifier: &str) -> String {
        format!("{}/works/{}", self.base_url, urlencoding::encode(identifier))
    }

    /// Builds the URL for the field-search endpoint.
    fn search_url(&self, query: &SearchQuery) -> String {
        format!("{}/works?{}", self.base_url, query.to_query_string())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.client.get(url).send().await?;

        // Crossref publishes its rate limit in response headers; worth a trace.
        if let Some(limit) = response.headers().get("x-rate-limit-limit") {
            debug!(rate_limit = ?limit, "Crossref rate limit");
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(ClientError::Json)
    }
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient")
            .field("base_url", &self.base_url)
            .field("worker", &self.worker)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataProvider for CrossrefClient {
    #[tracing::instrument(skip(self), fields(worker = %self.worker))]
    async fn fetch_work(&self, identifier: &str) -> Result<WorkMessage, ClientError> {
        info!(worker = %self.worker, "GET works/{identifier}");

        let url = self.works_url(identifier);
        let body: WorkResponse = self.get_json(&url).await?;

        if !body.status.eq_ignore_ascii_case("ok") {
            return Err(ClientError::NotOk(body.status));
        }

        Ok(body.message)
    }

    #[tracing::instrument(skip(self, query), fields(worker = %self.worker))]
    async fn search_works(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, ClientError> {
        let query_string = query.to_query_string();
        info!(worker = %self.worker, "GET works?{query_string}");

        let url = self.search_url(query);
        let body: SearchResponse = self.get_json(&url).await?;

        if !body.status.eq_ignore_ascii_case("ok") {
            return Err(ClientError::NotOk(body.status));
        }

        Ok(body.message.items)
    }
}

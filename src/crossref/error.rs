//! Error types for the Crossref metadata client.

use thiserror::Error;

/// Errors produced by the metadata client.
///
/// `QueryKeyNotAllowed` is a caller bug (fail fast, but as a returned error
/// rather than a process abort); the remaining variants are recoverable
/// transport/format failures a batch caller may skip past.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A search query used a key outside the allow-list.
    #[error("query key '{key}' not allowed; allowed keys: {}", allowed.join(", "))]
    QueryKeyNotAllowed {
        /// The offending key.
        key: String,
        /// The full allow-list, for the user-facing message.
        allowed: Vec<&'static str>,
    },

    /// Contact address contains characters illegal in a header value.
    #[error("mailto contains invalid control characters: {0:?}")]
    InvalidMailto(String),

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Network-level request failure (connect, timeout, transport).
    #[error("request to Crossref failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Crossref returned a non-success HTTP status.
    #[error("Crossref returned HTTP {status} for {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The request URL, for diagnostics.
        url: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("unexpected Crossref response format: {0}")]
    Json(#[source] reqwest::Error),

    /// Crossref's own status field was not "ok".
    #[error("Crossref response status was '{0}', expected 'ok'")]
    NotOk(String),
}

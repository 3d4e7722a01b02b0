//! Search query construction with an explicit key allow-list.
//!
//! Crossref field queries are restricted to the keys this crawler knows how
//! to build; an unrecognized key is a caller bug surfaced as a typed
//! validation error before any network call.

use super::error::ClientError;

/// The full set of recognized field-query keys.
pub const ALLOWED_QUERY_KEYS: [&str; 2] = ["query.author", "query.title"];

/// Encodes a query value: spaces become `+`, everything else is
/// percent-encoded with literal `+` preserved.
#[must_use]
pub(crate) fn encode_query_value(value: &str) -> String {
    let plus_joined = value.replace(' ', "+");
    urlencoding::encode(&plus_joined).replace("%2B", "+")
}

/// An ordered set of allow-listed field-query parameters.
///
/// Parameters serialize in insertion order, so request URLs are
/// deterministic and assertable in tests.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    params: Vec<(&'static str, String)>,
}

impl SearchQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter after validating the key against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::QueryKeyNotAllowed`] (listing the allowed keys)
    /// when `key` is not recognized.
    pub fn try_insert(&mut self, key: &str, value: impl Into<String>) -> Result<(), ClientError> {
        let Some(allowed_key) = ALLOWED_QUERY_KEYS.iter().find(|k| **k == key) else {
            return Err(ClientError::QueryKeyNotAllowed {
                key: key.to_string(),
                allowed: ALLOWED_QUERY_KEYS.to_vec(),
            });
        };
        self.params.push((allowed_key, value.into()));
        Ok(())
    }

    /// Adds a `query.author` parameter.
    #[must_use]
    pub fn author(mut self, value: impl Into<String>) -> Self {
        self.params.push(("query.author", value.into()));
        self
    }

    /// Adds a `query.title` parameter.
    #[must_use]
    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.params.push(("query.title", value.into()));
        self
    }

    /// True when no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serializes to `key=encoded-value&...` in insertion order.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{key}={}", encode_query_value(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

//! Citation-string resolver seam.
//!
//! Turning an unstructured citation string into structured author/title
//! fields is delegated to an external reference-parsing engine, treated as a
//! black box behind the [`ReferenceParser`] trait. The output is a
//! best-effort guess and may be empty (no authors, or no title), which the
//! pipeline treats as "unparseable".
//!
//! [`AnystyleParser`] is the production adapter around the `anystyle` CLI.

mod anystyle;
mod error;

pub use anystyle::AnystyleParser;
pub use error::ParserError;

use async_trait::async_trait;
use serde::Deserialize;

/// Structured best-effort guess extracted from one citation string.
///
/// Field names mirror the external engine's JSON output (`author[]` with
/// `given`/`family`, `title[]`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedReference {
    #[serde(default)]
    pub author: Vec<ParsedAuthor>,
    #[serde(default)]
    pub title: Vec<String>,
}

/// One parsed author name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
}

impl ParsedAuthor {
    /// Formats as `"Given Family"`, degrading to whichever part exists.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (&self.given, &self.family) {
            (Some(g), Some(f)) => format!("{g} {f}"),
            (Some(g), None) => g.clone(),
            (None, Some(f)) => f.clone(),
            (None, None) => String::new(),
        }
    }
}

impl ParsedReference {
    /// Returns the first author name and first title when both are usable.
    ///
    /// `None` signals insufficient data: the parse produced no author with a
    /// non-empty name, or no non-empty title.
    #[must_use]
    pub fn primary_fields(&self) -> Option<(String, &str)> {
        let author = self
            .author
            .iter()
            .map(ParsedAuthor::full_name)
            .find(|name| !name.is_empty())?;
        let title = self
            .title
            .iter()
            .map(String::as_str)
            .find(|t| !t.trim().is_empty())?;
        Some((author, title))
    }
}

/// Capability trait for the external citation-string parser.
///
/// Synchronous call-and-structured-result contract; implementations block the
/// caller until the engine finishes. Tests substitute deterministic doubles.
#[async_trait]
pub trait ReferenceParser: Send + Sync {
    /// Parses one free-text citation string into structured fields.
    ///
    /// An empty result (no authors or no title) is a valid "unparseable"
    /// answer, not an error; errors are reserved for engine failures.
    async fn parse(&self, text: &str) -> Result<ParsedReference, ParserError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_reference_deserializes_engine_output() {
        let json = serde_json::json!({
            "author": [{"given": "J", "family": "Smith"}],
            "title": ["Title Of Paper"]
        });
        let parsed: ParsedReference = serde_json::from_value(json).unwrap();
        let (author, title) = parsed.primary_fields().unwrap();
        assert_eq!(author, "J Smith");
        assert_eq!(title, "Title Of Paper");
    }

    #[test]
    fn test_primary_fields_missing_author_is_none() {
        let parsed = ParsedReference {
            author: vec![],
            title: vec!["Some Title".to_string()],
        };
        assert!(parsed.primary_fields().is_none());
    }

    #[test]
    fn test_primary_fields_missing_title_is_none() {
        let parsed = ParsedReference {
            author: vec![ParsedAuthor {
                given: Some("J".to_string()),
                family: Some("Smith".to_string()),
            }],
            title: vec![],
        };
        assert!(parsed.primary_fields().is_none());
    }

    #[test]
    fn test_primary_fields_skips_empty_entries() {
        let parsed = ParsedReference {
            author: vec![
                ParsedAuthor::default(),
                ParsedAuthor {
                    given: None,
                    family: Some("Doe".to_string()),
                },
            ],
            title: vec![" ".to_string(), "Real Title".to_string()],
        };
        let (author, title) = parsed.primary_fields().unwrap();
        assert_eq!(author, "Doe");
        assert_eq!(title, "Real Title");
    }

    #[test]
    fn test_full_name_family_only() {
        let author = ParsedAuthor {
            given: None,
            family: Some("Consortium".to_string()),
        };
        assert_eq!(author.full_name(), "Consortium");
    }

    #[test]
    fn test_unknown_fields_in_engine_output_ignored() {
        let json = serde_json::json!({
            "author": [{"given": "A", "family": "B", "particle": "van"}],
            "title": ["T"],
            "date": ["2001"],
            "type": "article-journal"
        });
        let parsed: ParsedReference = serde_json::from_value(json).unwrap();
        assert!(parsed.primary_fields().is_some());
    }
}

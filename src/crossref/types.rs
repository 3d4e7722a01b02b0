//! Serde types for Crossref works/search responses.

use serde::Deserialize;

/// Top-level response from `GET /works/{doi}`.
#[derive(Debug, Deserialize)]
pub struct WorkResponse {
    /// Crossref reports `"ok"` on success.
    pub status: String,
    pub message: WorkMessage,
}

/// The `message` field of a single-work response.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkMessage {
    /// The work's own DOI as reported by Crossref.
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub title: Option<Vec<String>>,
    pub author: Option<Vec<ContributorName>>,
    /// The work's cited reference list; absent when Crossref has none on file.
    pub reference: Option<Vec<RawReference>>,
}

impl WorkMessage {
    /// Returns the reference list, treating an absent list as empty.
    #[must_use]
    pub fn references(&self) -> &[RawReference] {
        self.reference.as_deref().unwrap_or(&[])
    }

    /// Display-joins the author list as `"Family, Given; ..."`.
    ///
    /// Returns `None` when no authors produce a non-empty name.
    #[must_use]
    pub fn joined_authors(&self) -> Option<String> {
        let formatted: Vec<String> = self
            .author
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(ContributorName::display_name)
            .filter(|s| !s.is_empty())
            .collect();
        if formatted.is_empty() {
            None
        } else {
            Some(formatted.join("; "))
        }
    }

    /// The first title, when present and non-empty.
    #[must_use]
    pub fn first_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .and_then(|titles| titles.first())
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// An author name entry (`given` / `family`).
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorName {
    pub given: Option<String>,
    pub family: Option<String>,
}

impl ContributorName {
    /// Formats as `"Family, Given"`, degrading to whichever part exists.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.family, &self.given) {
            (Some(f), Some(g)) => format!("{f}, {g}"),
            (Some(f), None) => f.clone(),
            (None, Some(g)) => g.clone(),
            (None, None) => String::new(),
        }
    }
}

/// One entry in a work's cited reference list.
///
/// A reference either carries a confirmed `DOI`, or only unstructured free
/// text (optionally with an ISSN, which is informational).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReference {
    /// Confirmed target identifier, when Crossref already resolved it.
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    /// Journal ISSN, surfaced as an informational signal only.
    #[serde(rename = "ISSN")]
    pub issn: Option<String>,
    /// Free-text citation string for unresolved references.
    pub unstructured: Option<String>,
}

/// Top-level response from `GET /works?query.*`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub message: SearchMessage,
}

/// The `message` field of a search response.
#[derive(Debug, Deserialize)]
pub struct SearchMessage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One search result candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub title: Option<Vec<String>>,
    pub author: Option<Vec<ContributorName>>,
}

impl SearchItem {
    /// The candidate's first title, when present.
    #[must_use]
    pub fn first_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .and_then(|titles| titles.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_work_response_deserialize_full() {
        let json = serde_json::json!({
            "status": "ok",
            "message": {
                "DOI": "10.1007/s11340-011-9584-y",
                "title": ["A Test Paper"],
                "author": [
                    {"given": "John", "family": "Smith"},
                    {"given": "Jane", "family": "Doe"}
                ],
                "reference": [
                    {"DOI": "10.1234/cited", "unstructured": "Cited work"},
                    {"unstructured": "Smith, J. Title Of Paper. 2001", "ISSN": "0014-4851"}
                ]
            }
        });

        let resp: WorkResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.message.doi.as_deref(), Some("10.1007/s11340-011-9584-y"));
        assert_eq!(resp.message.references().len(), 2);
        assert_eq!(resp.message.references()[0].doi.as_deref(), Some("10.1234/cited"));
        assert!(resp.message.references()[1].doi.is_none());
        assert_eq!(resp.message.references()[1].issn.as_deref(), Some("0014-4851"));
    }

    #[test]
    fn test_work_response_deserialize_minimal() {
        let json = serde_json::json!({"status": "ok", "message": {}});

        let resp: WorkResponse = serde_json::from_value(json).unwrap();
        assert!(resp.message.doi.is_none());
        assert!(resp.message.references().is_empty());
        assert!(resp.message.joined_authors().is_none());
        assert!(resp.message.first_title().is_none());
    }

    #[test]
    fn test_joined_authors_formats_family_given() {
        let message = WorkMessage {
            doi: None,
            title: None,
            author: Some(vec![
                ContributorName {
                    given: Some("John".to_string()),
                    family: Some("Smith".to_string()),
                },
                ContributorName {
                    given: None,
                    family: Some("Consortium".to_string()),
                },
            ]),
            reference: None,
        };
        assert_eq!(
            message.joined_authors().unwrap(),
            "Smith, John; Consortium"
        );
    }

    #[test]
    fn test_search_response_missing_items_defaults_empty() {
        let json = serde_json::json!({"status": "ok", "message": {}});
        let resp: SearchResponse = serde_json::from_value(json).unwrap();
        assert!(resp.message.items.is_empty());
    }

    #[test]
    fn test_search_item_first_title() {
        let json = serde_json::json!({
            "DOI": "10.1234/hit",
            "title": ["Title Of Paper", "Alternate"],
            "author": [{"given": "J", "family": "Smith"}]
        });
        let item: SearchItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.first_title(), Some("Title Of Paper"));
        assert_eq!(item.doi.as_deref(), Some("10.1234/hit"));
    }
}

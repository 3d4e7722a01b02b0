//! Row types for the literature/citation graph.

use serde_json::Error as JsonError;
use sqlx::FromRow;

/// A persisted literature node (one scholarly work).
///
/// The `identifier` (a DOI) is unique per node and immutable after creation;
/// it is the sole foreign key used by citation edges.
#[derive(Debug, Clone, FromRow)]
pub struct LiteratureNode {
    /// Auto-incrementing row id.
    pub lit_id: i64,
    /// Persistent globally unique identifier (DOI).
    pub identifier: String,
    /// Display-joined author list (`"Family, Given; ..."`).
    pub authors: Option<String>,
    /// First title of the work, when known.
    pub title: Option<String>,
    /// Raw reference strings/identifiers serialized as a JSON array.
    pub raw_references: Option<String>,
}

impl LiteratureNode {
    /// Deserializes the stored raw reference list.
    ///
    /// Returns an empty list when no references were recorded.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the stored column is not a valid JSON array.
    pub fn raw_reference_list(&self) -> Result<Vec<String>, JsonError> {
        match &self.raw_references {
            Some(json) => serde_json::from_str(json),
            None => Ok(Vec::new()),
        }
    }
}

/// Fields for inserting a new literature node.
#[derive(Debug, Clone, Default)]
pub struct NewLiteratureNode<'a> {
    /// Persistent globally unique identifier (DOI).
    pub identifier: &'a str,
    /// Display-joined author list.
    pub authors: Option<String>,
    /// First title of the work.
    pub title: Option<String>,
    /// Raw reference strings, serialized to JSON on insert.
    pub raw_references: Option<Vec<String>>,
}

impl<'a> NewLiteratureNode<'a> {
    /// Creates a minimal node carrying only the identifier.
    ///
    /// Used for placeholder nodes created when a reference resolves to a work
    /// that has not been fetched yet.
    #[must_use]
    pub fn bare(identifier: &'a str) -> Self {
        Self {
            identifier,
            ..Self::default()
        }
    }
}

/// A persisted citation edge: `from_identifier` cites `to_identifier`.
#[derive(Debug, Clone, FromRow)]
pub struct CitationEdge {
    /// Auto-incrementing row id.
    pub net_id: i64,
    /// Identifier of the citing work.
    pub from_identifier: String,
    /// Identifier of the cited work.
    pub to_identifier: String,
}

//! Literature/citation graph store.
//!
//! SQLite-backed persistence for the citation graph:
//! - [`LiteratureNode`] rows in the `literature` table (one scholarly work each)
//! - [`CitationEdge`] rows in the `network` table ("work A cites work B")
//!
//! The store contract is deliberately small: idempotent schema creation plus
//! insert/lookup. No update or delete operations exist; a node's identifier is
//! immutable once assigned and is the sole foreign key used by edges.
//!
//! # Example
//!
//! ```ignore
//! use citenet_core::graph::GraphStore;
//! use citenet_core::Database;
//!
//! let db = Database::new_in_memory().await?;
//! let store = GraphStore::new(db);
//! store.ensure_schema().await?;
//! store.insert_edge("10.1234/a", "10.1234/b").await?;
//! ```

mod error;
mod node;

pub use error::{GraphDbErrorKind, GraphError};
pub use node::{CitationEdge, LiteratureNode, NewLiteratureNode};

use sqlx::Row;
use tracing::{info, instrument};

use crate::db::Database;

/// Result type for graph store operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Declared schema: table name plus `(column, type, constraint)` triples in
/// declared order. `ensure_schema` creates each missing table from exactly
/// these columns.
const SCHEMA: &[(&str, &[(&str, &str, &str)])] = &[
    (
        "literature",
        &[
            ("lit_id", "INTEGER", "PRIMARY KEY"),
            ("identifier", "TEXT", "NOT NULL UNIQUE"),
            ("authors", "TEXT", ""),
            ("title", "TEXT", ""),
            ("raw_references", "TEXT", ""),
        ],
    ),
    (
        "network",
        &[
            ("net_id", "INTEGER", "PRIMARY KEY"),
            ("from_identifier", "TEXT", "NOT NULL"),
            ("to_identifier", "TEXT", "NOT NULL"),
        ],
    ),
];

/// Builds the `CREATE TABLE` statement for one declared table.
fn create_table_sql(table: &str, columns: &[(&str, &str, &str)]) -> String {
    let cols = columns
        .iter()
        .map(|(name, ty, constraint)| {
            if constraint.is_empty() {
                format!("{name} {ty}")
            } else {
                format!("{name} {ty} {constraint}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {table} ({cols})")
}

/// Store for literature nodes and citation edges.
///
/// Backed by a single [`Database`] pool held for the process lifetime.
/// Concurrent writers are out of scope for this store.
#[derive(Debug, Clone)]
pub struct GraphStore {
    db: Database,
}

impl GraphStore {
    /// Creates a new graph store over the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Ensures the declared schema exists. Idempotent.
    ///
    /// Reads existing table names from `sqlite_master` and issues a creation
    /// statement for each missing table, with exactly the declared columns in
    /// declared order. Existing tables are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] if a statement fails; callers should
    /// treat this as a fatal initialization error.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<()> {
        let existing = self.table_names().await?;

        for (table, columns) in SCHEMA {
            if existing.iter().any(|name| name == table) {
                continue;
            }
            info!(table, "table missing from store, creating");
            sqlx::query(&create_table_sql(table, columns))
                .execute(self.db.pool())
                .await?;
        }

        Ok(())
    }

    /// Returns the user table names currently present in the database.
    async fn table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// Inserts a new literature node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] with a constraint-violation kind when a
    /// node with the same identifier already exists.
    #[instrument(skip(self, node), fields(identifier = %node.identifier))]
    pub async fn insert_node(&self, node: &NewLiteratureNode<'_>) -> Result<i64> {
        // Vec<String> serialization cannot fail.
        let raw_references = node
            .raw_references
            .as_ref()
            .and_then(|refs| serde_json::to_string(refs).ok());

        let row = sqlx::query(
            r"INSERT INTO literature (identifier, authors, title, raw_references)
              VALUES (?, ?, ?, ?)
              RETURNING lit_id",
        )
        .bind(node.identifier)
        .bind(node.authors.as_deref())
        .bind(node.title.as_deref())
        .bind(raw_references)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("lit_id"))
    }

    /// Inserts a literature node unless one already exists for the identifier.
    ///
    /// Returns the row id of the existing or newly created node. Existing
    /// nodes are never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] if the insert or lookup fails.
    #[instrument(skip(self, node), fields(identifier = %node.identifier))]
    pub async fn ensure_node(&self, node: &NewLiteratureNode<'_>) -> Result<i64> {
        if let Some(existing) = self.find_node(node.identifier).await? {
            return Ok(existing.lit_id);
        }
        self.insert_node(node).await
    }

    /// Records a citation edge from one identifier to another.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] if the insert fails.
    #[instrument(skip(self))]
    pub async fn insert_edge(&self, from_identifier: &str, to_identifier: &str) -> Result<i64> {
        let row = sqlx::query(
            r"INSERT INTO network (from_identifier, to_identifier)
              VALUES (?, ?)
              RETURNING net_id",
        )
        .bind(from_identifier)
        .bind(to_identifier)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("net_id"))
    }

    /// Looks up a literature node by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn find_node(&self, identifier: &str) -> Result<Option<LiteratureNode>> {
        let node = sqlx::query_as::<_, LiteratureNode>(
            r"SELECT lit_id, identifier, authors, title, raw_references
              FROM literature
              WHERE identifier = ?",
        )
        .bind(identifier)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(node)
    }

    /// Returns all citation edges originating from the given identifier,
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn edges_from(&self, from_identifier: &str) -> Result<Vec<CitationEdge>> {
        let edges = sqlx::query_as::<_, CitationEdge>(
            r"SELECT net_id, from_identifier, to_identifier
              FROM network
              WHERE from_identifier = ?
              ORDER BY net_id ASC",
        )
        .bind(from_identifier)
        .fetch_all(self.db.pool())
        .await?;

        Ok(edges)
    }
}

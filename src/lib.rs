//! Citenet Core Library
//!
//! This library provides the core functionality for the citenet tool, which
//! grows a citation network: starting from DOIs, it fetches work metadata
//! from Crossref, resolves each listed reference to a DOI (directly or by
//! parsing the citation string and fuzzy-matching search results), and
//! persists the resulting literature nodes and citation edges in SQLite.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection management
//! - [`graph`] - Literature/citation graph persistence
//! - [`crossref`] - Crossref works API client
//! - [`parser`] - Citation-string parser adapter
//! - [`pipeline`] - Reference resolution pipeline and fuzzy scoring
//! - [`crawl`] - Per-work crawl orchestration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod crossref;
pub mod db;
pub mod graph;
pub mod parser;
pub mod pipeline;

mod user_agent;

// Re-export commonly used types
pub use crawl::{CrawlError, CrawlSummary, Crawler};
pub use crossref::{ClientError, CrossrefClient, MetadataProvider, SearchQuery, WorkMessage};
pub use db::{Database, DbError};
pub use graph::{CitationEdge, GraphError, GraphStore, LiteratureNode, NewLiteratureNode};
pub use parser::{AnystyleParser, ParsedReference, ParserError, ReferenceParser};
pub use pipeline::{
    ACCEPT_THRESHOLD, AbandonPolicy, PipelineError, Resolution, ResolutionPipeline, WorkReport,
};

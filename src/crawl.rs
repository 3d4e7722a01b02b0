//! Crawl orchestration: pipeline decisions wired to the graph store.
//!
//! [`Crawler::crawl`] fetches one work, persists its literature node, runs
//! the resolution pipeline over its references, and records a citation edge
//! (plus a placeholder node) for every resolved target. Failures are typed
//! and recoverable so a batch caller can log one work's failure and keep
//! going.

use thiserror::Error;
use tracing::{info, instrument};

use crate::crossref::{MetadataProvider, WorkMessage};
use crate::graph::{GraphError, GraphStore, NewLiteratureNode};
use crate::parser::ReferenceParser;
use crate::pipeline::{PipelineError, ResolutionPipeline, WorkReport};

/// Errors that abort one work's crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Metadata API or parser-engine failure during resolution.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Graph store failure while persisting nodes or edges.
    #[error(transparent)]
    Store(#[from] GraphError),
}

/// Summary of one crawled work.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Identifier the crawl was asked for.
    pub identifier: String,
    /// Row id of the work's literature node.
    pub node_id: i64,
    /// Number of citation edges recorded.
    pub edges_created: usize,
    /// Number of references that ended unresolved.
    pub unresolved: usize,
    /// True when the abandon-work policy cut the reference loop short.
    pub halted: bool,
}

/// Ties the resolution pipeline to the graph store.
#[derive(Debug)]
pub struct Crawler<M, P> {
    pipeline: ResolutionPipeline<M, P>,
    store: GraphStore,
}

impl<M: MetadataProvider, P: ReferenceParser> Crawler<M, P> {
    /// Creates a crawler over an initialized store.
    #[must_use]
    pub fn new(pipeline: ResolutionPipeline<M, P>, store: GraphStore) -> Self {
        Self { pipeline, store }
    }

    /// Crawls one work: fetch, persist node, resolve references, persist
    /// edges.
    ///
    /// The work's node is created if absent; nodes are never mutated, so
    /// re-crawling an identifier only appends newly resolved edges. Every
    /// resolved target gets a placeholder node carrying just its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] on metadata, parser, or store failure.
    #[instrument(skip(self))]
    pub async fn crawl(&self, identifier: &str) -> Result<CrawlSummary, CrawlError> {
        let work = self.pipeline.fetch_work(identifier).await?;

        // Prefer the DOI Crossref reports; fall back to what was asked for.
        let work_identifier = work.doi.clone().unwrap_or_else(|| identifier.to_string());

        let node_id = self.store.ensure_node(&work_node(&work_identifier, &work)).await?;

        let report = self.pipeline.resolve_references(&work_identifier, &work).await?;
        let edges_created = self.persist_edges(&report).await?;

        info!(
            work = %work_identifier,
            edges = edges_created,
            unresolved = report.unresolved_count(),
            halted = report.halted,
            "work crawled"
        );

        Ok(CrawlSummary {
            identifier: work_identifier,
            node_id,
            edges_created,
            unresolved: report.unresolved_count(),
            halted: report.halted,
        })
    }

    /// Records an edge and a placeholder node for every resolved target.
    async fn persist_edges(&self, report: &WorkReport) -> Result<usize, CrawlError> {
        let mut created = 0;
        for target in report.edge_targets() {
            self.store
                .ensure_node(&NewLiteratureNode::bare(target))
                .await?;
            self.store
                .insert_edge(&report.work_identifier, target)
                .await?;
            created += 1;
        }
        Ok(created)
    }
}

/// Builds the literature node row for a fetched work.
fn work_node<'a>(identifier: &'a str, work: &WorkMessage) -> NewLiteratureNode<'a> {
    let raw_references: Vec<String> = work
        .references()
        .iter()
        .filter_map(|r| {
            r.doi
                .clone()
                .or_else(|| r.unstructured.clone())
        })
        .collect();

    NewLiteratureNode {
        identifier,
        authors: work.joined_authors(),
        title: work.first_title().map(ToString::to_string),
        raw_references: (!raw_references.is_empty()).then_some(raw_references),
    }
}

//! Reference-resolution pipeline.
//!
//! The algorithmic core of the crawler. Given a fetched work record, each
//! entry in its reference list is classified:
//!
//! - a confirmed `DOI` yields a direct citation edge;
//! - an unstructured-only reference goes through the external string parser,
//!   a Crossref field search, and fuzzy candidate scoring with the
//!   [`ACCEPT_THRESHOLD`] acceptance bar;
//! - insufficient data at any stage (unparseable text, zero candidates, best
//!   score below the bar) marks the reference unresolved — a soft stop
//!   reported as a warning, never an `Err`.
//!
//! What happens to the *remaining* references after a soft stop is an
//! explicit policy choice ([`AbandonPolicy`]): skip just that reference, or
//! abandon the rest of the work's list.
//!
//! Every decision is recorded on the returned [`WorkReport`] so callers and
//! tests can assert on outcomes rather than log text.

mod scoring;

pub use scoring::{ACCEPT_THRESHOLD, partial_ratio, pick_best, score_candidates};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::crossref::{ClientError, MetadataProvider, RawReference, SearchQuery, WorkMessage};
use crate::parser::{ParserError, ReferenceParser};

/// What to abandon when a reference lacks sufficient data to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbandonPolicy {
    /// Skip the one reference and keep processing the rest of the list.
    #[default]
    Reference,
    /// Stop processing the work's remaining references on the first
    /// insufficient-data case (the behavior of early crawler revisions).
    Work,
}

/// Why an unstructured reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The reference carried neither a DOI nor unstructured text.
    NoReferenceText,
    /// The string parser found no usable author or no usable title.
    IncompleteParse,
    /// The search returned zero candidates.
    NoCandidates,
    /// The best candidate scored below the acceptance threshold.
    BelowThreshold {
        /// The best score observed.
        best: u8,
    },
    /// The winning candidate carried no identifier to edge to.
    MissingIdentifier,
}

/// Terminal classification for one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reference already carried a confirmed identifier.
    Direct {
        /// The cited work's identifier.
        target: String,
    },
    /// An unstructured reference was fuzzy-matched to a search candidate.
    Matched {
        /// The accepted candidate's identifier.
        target: String,
        /// The accepted candidate's fuzzy score.
        score: u8,
    },
    /// The reference could not be resolved (soft stop).
    Unresolved(UnresolvedReason),
}

/// The recorded outcome for one reference list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOutcome {
    /// Position in the work's reference list.
    pub index: usize,
    /// ISSN surfaced on the reference, informational only.
    pub issn: Option<String>,
    /// Terminal classification.
    pub resolution: Resolution,
}

impl ReferenceOutcome {
    /// The resolved edge target, when this outcome produced one.
    #[must_use]
    pub fn edge_target(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Direct { target } | Resolution::Matched { target, .. } => Some(target),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Per-work resolution report.
#[derive(Debug, Clone)]
pub struct WorkReport {
    /// Identifier of the work whose references were processed.
    pub work_identifier: String,
    /// One outcome per processed reference, in list order.
    pub outcomes: Vec<ReferenceOutcome>,
    /// True when [`AbandonPolicy::Work`] cut the loop short.
    pub halted: bool,
}

impl WorkReport {
    /// Identifiers this work was resolved to cite, in reference order.
    #[must_use]
    pub fn edge_targets(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(ReferenceOutcome::edge_target)
            .collect()
    }

    /// Number of references that ended unresolved.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.resolution, Resolution::Unresolved(_)))
            .count()
    }
}

/// Errors that abort resolution for a work.
///
/// Soft stops (insufficient data) are recorded as [`Resolution::Unresolved`]
/// outcomes and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Metadata API failure (network, status, malformed JSON).
    #[error(transparent)]
    Metadata(#[from] ClientError),

    /// External string-parser engine failure.
    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Orchestrates reference classification and unstructured resolution.
///
/// Generic over the two collaborator seams so tests run on deterministic
/// doubles. Single-threaded and synchronous per work; each external call
/// blocks until completion.
#[derive(Debug)]
pub struct ResolutionPipeline<M, P> {
    metadata: M,
    parser: P,
    policy: AbandonPolicy,
}

impl<M: MetadataProvider, P: ReferenceParser> ResolutionPipeline<M, P> {
    /// Creates a pipeline with the default [`AbandonPolicy::Reference`].
    #[must_use]
    pub fn new(metadata: M, parser: P) -> Self {
        Self {
            metadata,
            parser,
            policy: AbandonPolicy::default(),
        }
    }

    /// Overrides the abandonment policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AbandonPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetches the work record for an identifier via the metadata seam.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Metadata`] on API failure.
    pub async fn fetch_work(&self, identifier: &str) -> Result<WorkMessage, PipelineError> {
        Ok(self.metadata.fetch_work(identifier).await?)
    }

    /// Classifies and resolves every reference of a fetched work.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on metadata API or parser-engine failure;
    /// insufficient-data cases are outcomes, not errors.
    #[instrument(skip(self, work), fields(work = %identifier))]
    pub async fn resolve_references(
        &self,
        identifier: &str,
        work: &WorkMessage,
    ) -> Result<WorkReport, PipelineError> {
        let mut outcomes = Vec::new();
        let mut halted = false;

        for (index, reference) in work.references().iter().enumerate() {
            if let Some(issn) = &reference.issn {
                info!(reference = index, issn = %issn, "reference carries ISSN");
            }

            let resolution = if let Some(target) = &reference.doi {
                info!(reference = index, doi = %target, "found DOI");
                Resolution::Direct {
                    target: target.clone(),
                }
            } else {
                self.resolve_unstructured(index, reference).await?
            };

            let unresolved = matches!(resolution, Resolution::Unresolved(_));
            outcomes.push(ReferenceOutcome {
                index,
                issn: reference.issn.clone(),
                resolution,
            });

            if unresolved && self.policy == AbandonPolicy::Work {
                warn!(
                    reference = index,
                    "insufficient data; abandoning remaining references for this work"
                );
                halted = true;
                break;
            }
        }

        Ok(WorkReport {
            work_identifier: identifier.to_string(),
            outcomes,
            halted,
        })
    }

    /// Resolves one unstructured-only reference via parse + search + scoring.
    async fn resolve_unstructured(
        &self,
        index: usize,
        reference: &RawReference,
    ) -> Result<Resolution, PipelineError> {
        let Some(text) = reference.unstructured.as_deref() else {
            warn!(reference = index, "reference has no identifier and no text");
            return Ok(Resolution::Unresolved(UnresolvedReason::NoReferenceText));
        };

        let parsed = self.parser.parse(text).await?;
        let Some((author, title)) = parsed.primary_fields() else {
            warn!(
                reference = index,
                "parser found no usable author/title; marking unresolved"
            );
            return Ok(Resolution::Unresolved(UnresolvedReason::IncompleteParse));
        };

        let query = SearchQuery::new().author(author).title(title);
        let items = self.metadata.search_works(&query).await?;
        if items.is_empty() {
            warn!(reference = index, "search returned no candidates");
            return Ok(Resolution::Unresolved(UnresolvedReason::NoCandidates));
        }

        let scores = score_candidates(title, &items);
        // items is non-empty, so pick_best always yields an index.
        let Some(best_index) = pick_best(&scores) else {
            return Ok(Resolution::Unresolved(UnresolvedReason::NoCandidates));
        };
        let best_score = scores[best_index];

        if best_score < ACCEPT_THRESHOLD {
            warn!(
                reference = index,
                best = best_score,
                "no suitable option among candidates"
            );
            return Ok(Resolution::Unresolved(UnresolvedReason::BelowThreshold {
                best: best_score,
            }));
        }

        match &items[best_index].doi {
            Some(target) => {
                info!(
                    reference = index,
                    doi = %target,
                    score = best_score,
                    "accepted fuzzy match"
                );
                Ok(Resolution::Matched {
                    target: target.clone(),
                    score: best_score,
                })
            }
            None => {
                warn!(
                    reference = index,
                    score = best_score,
                    "winning candidate has no identifier"
                );
                Ok(Resolution::Unresolved(UnresolvedReason::MissingIdentifier))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crossref::SearchItem;
    use crate::parser::ParsedReference;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Metadata double returning canned search items and counting calls.
    #[derive(Clone, Default)]
    struct StubProvider {
        items: Vec<SearchItem>,
        search_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MetadataProvider for StubProvider {
        async fn fetch_work(&self, _identifier: &str) -> Result<WorkMessage, ClientError> {
            unimplemented!("resolve_references tests never fetch")
        }

        async fn search_works(&self, _query: &SearchQuery) -> Result<Vec<SearchItem>, ClientError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.clone())
        }
    }

    /// Parser double returning a canned parse and counting calls.
    #[derive(Clone, Default)]
    struct StubParser {
        result: ParsedReference,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ReferenceParser for StubParser {
        async fn parse(&self, _text: &str) -> Result<ParsedReference, ParserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    fn work_from_json(json: serde_json::Value) -> WorkMessage {
        serde_json::from_value(json).unwrap()
    }

    fn smith_parse() -> ParsedReference {
        serde_json::from_value(serde_json::json!({
            "author": [{"given": "J", "family": "Smith"}],
            "title": ["Title Of Paper"]
        }))
        .unwrap()
    }

    fn items_from_json(json: serde_json::Value) -> Vec<SearchItem> {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn test_all_confirmed_references_emit_direct_edges_only() {
        let provider = StubProvider::default();
        let parser = StubParser::default();
        let search_calls = Arc::clone(&provider.search_calls);
        let parse_calls = Arc::clone(&parser.calls);
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [
                {"DOI": "10.1234/first"},
                {"DOI": "10.1234/second", "unstructured": "also has text"}
            ]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();

        assert_eq!(report.edge_targets(), vec!["10.1234/first", "10.1234/second"]);
        assert_eq!(report.unresolved_count(), 0);
        assert!(!report.halted);
        assert_eq!(parse_calls.load(Ordering::SeqCst), 0, "parser must not run");
        assert_eq!(search_calls.load(Ordering::SeqCst), 0, "search must not run");
    }

    #[tokio::test]
    async fn test_unparseable_reference_never_reaches_search() {
        let provider = StubProvider::default();
        let parser = StubParser::default(); // empty author/title = unparseable
        let search_calls = Arc::clone(&provider.search_calls);
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "garbled beyond repair"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();

        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Unresolved(UnresolvedReason::IncompleteParse)
        );
        assert_eq!(search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_title_match_is_accepted() {
        let provider = StubProvider {
            items: items_from_json(serde_json::json!([
                {"DOI": "10.1234/hit", "title": ["Title Of Paper"]}
            ])),
            ..StubProvider::default()
        };
        let parser = StubParser {
            result: smith_parse(),
            ..StubParser::default()
        };
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "Smith, J. Title Of Paper. 2001"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();

        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Matched {
                target: "10.1234/hit".to_string(),
                score: 100
            }
        );
        assert_eq!(report.edge_targets(), vec!["10.1234/hit"]);
    }

    #[tokio::test]
    async fn test_tied_scores_select_first_listed_candidate() {
        // Both candidates carry the identical (perfect) title; the
        // earliest-listed one must win.
        let provider = StubProvider {
            items: items_from_json(serde_json::json!([
                {"DOI": "10.1234/low", "title": ["Wrong Thing Altogether"]},
                {"DOI": "10.1234/first-max", "title": ["Title Of Paper"]},
                {"DOI": "10.1234/second-max", "title": ["Title Of Paper"]}
            ])),
            ..StubProvider::default()
        };
        let parser = StubParser {
            result: smith_parse(),
            ..StubParser::default()
        };
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "Smith, J. Title Of Paper. 2001"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert_eq!(report.edge_targets(), vec!["10.1234/first-max"]);
    }

    #[tokio::test]
    async fn test_below_threshold_is_unresolved() {
        let provider = StubProvider {
            items: items_from_json(serde_json::json!([
                {"DOI": "10.1234/nope", "title": ["Nothing Like The Target At All"]}
            ])),
            ..StubProvider::default()
        };
        let parser = StubParser {
            result: smith_parse(),
            ..StubParser::default()
        };
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "Smith, J. Title Of Paper. 2001"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        match &report.outcomes[0].resolution {
            Resolution::Unresolved(UnresolvedReason::BelowThreshold { best }) => {
                assert!(*best < ACCEPT_THRESHOLD);
            }
            other => panic!("expected BelowThreshold, got: {other:?}"),
        }
        assert!(report.edge_targets().is_empty());
    }

    #[tokio::test]
    async fn test_zero_candidates_is_unresolved() {
        let provider = StubProvider::default();
        let parser = StubParser {
            result: smith_parse(),
            ..StubParser::default()
        };
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "Smith, J. Title Of Paper. 2001"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Unresolved(UnresolvedReason::NoCandidates)
        );
    }

    #[tokio::test]
    async fn test_winning_candidate_without_identifier_is_unresolved() {
        let provider = StubProvider {
            items: items_from_json(serde_json::json!([
                {"title": ["Title Of Paper"]}
            ])),
            ..StubProvider::default()
        };
        let parser = StubParser {
            result: smith_parse(),
            ..StubParser::default()
        };
        let pipeline = ResolutionPipeline::new(provider, parser);

        let work = work_from_json(serde_json::json!({
            "reference": [{"unstructured": "Smith, J. Title Of Paper. 2001"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Unresolved(UnresolvedReason::MissingIdentifier)
        );
    }

    #[tokio::test]
    async fn test_reference_without_text_or_identifier_is_unresolved() {
        let pipeline = ResolutionPipeline::new(StubProvider::default(), StubParser::default());

        let work = work_from_json(serde_json::json!({
            "reference": [{"ISSN": "0014-4851"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Unresolved(UnresolvedReason::NoReferenceText)
        );
    }

    #[tokio::test]
    async fn test_issn_is_informational_and_recorded() {
        let pipeline = ResolutionPipeline::new(StubProvider::default(), StubParser::default());

        let work = work_from_json(serde_json::json!({
            "reference": [{"DOI": "10.1234/cited", "ISSN": "0014-4851"}]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert_eq!(report.outcomes[0].issn.as_deref(), Some("0014-4851"));
        assert_eq!(
            report.outcomes[0].resolution,
            Resolution::Direct {
                target: "10.1234/cited".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_abandon_work_policy_halts_remaining_references() {
        let pipeline = ResolutionPipeline::new(StubProvider::default(), StubParser::default())
            .with_policy(AbandonPolicy::Work);

        let work = work_from_json(serde_json::json!({
            "reference": [
                {"unstructured": "unparseable"},
                {"DOI": "10.1234/never-reached"}
            ]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert!(report.halted);
        assert_eq!(report.outcomes.len(), 1, "second reference must be skipped");
    }

    #[tokio::test]
    async fn test_abandon_reference_policy_continues_past_failures() {
        let pipeline = ResolutionPipeline::new(StubProvider::default(), StubParser::default());

        let work = work_from_json(serde_json::json!({
            "reference": [
                {"unstructured": "unparseable"},
                {"DOI": "10.1234/still-reached"}
            ]
        }));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert!(!report.halted);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.edge_targets(), vec!["10.1234/still-reached"]);
    }

    #[tokio::test]
    async fn test_empty_reference_list_yields_empty_report() {
        let pipeline = ResolutionPipeline::new(StubProvider::default(), StubParser::default());
        let work = work_from_json(serde_json::json!({}));

        let report = pipeline.resolve_references("10.1234/work", &work).await.unwrap();
        assert!(report.outcomes.is_empty());
        assert!(!report.halted);
    }
}

//! Fuzzy candidate scoring for search results.
//!
//! Scores are a 0-100 partial-string similarity: the shorter string is slid
//! over every same-length window of the longer one and the best normalized
//! Levenshtein similarity wins. A candidate is accepted only at or above
//! [`ACCEPT_THRESHOLD`].

use crate::crossref::SearchItem;

/// Minimum score (inclusive) for accepting a fuzzy match.
pub const ACCEPT_THRESHOLD: u8 = 95;

/// Computes the 0-100 partial similarity between two strings.
///
/// The shorter string is compared against every contiguous same-length
/// character window of the longer; the best window similarity, scaled to
/// 0-100 and rounded, is returned. Equal strings score 100; an exact
/// substring also scores 100.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (needle, haystack) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let needle_chars: Vec<char> = needle.chars().collect();
    let haystack_chars: Vec<char> = haystack.chars().collect();

    if needle_chars.is_empty() {
        return u8::from(haystack_chars.is_empty()) * 100;
    }

    let needle_str: String = needle_chars.iter().collect();
    let mut best: f64 = 0.0;
    for window in haystack_chars.windows(needle_chars.len()) {
        let window_str: String = window.iter().collect();
        let similarity = strsim::normalized_levenshtein(&needle_str, &window_str);
        if similarity > best {
            best = similarity;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (best * 100.0).round() as u8
    }
}

/// Scores every candidate's first title against the fuzzy target.
///
/// Candidates without a title score 0. The returned scores align with the
/// input order.
#[must_use]
pub fn score_candidates(target: &str, items: &[SearchItem]) -> Vec<u8> {
    items
        .iter()
        .map(|item| {
            item.first_title()
                .map_or(0, |title| partial_ratio(target, title))
        })
        .collect()
}

/// Picks the index of the highest-scoring candidate.
///
/// Ties break toward the earliest-listed candidate (first maximum wins),
/// keeping selection deterministic. Returns `None` for an empty list.
#[must_use]
pub fn pick_best(scores: &[u8]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

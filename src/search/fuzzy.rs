//! Approximate string matching for "did you mean" style lookups.
//!
//! Works over any list of candidate strings; it knows nothing about the
//! collection. Similarity is normalized Levenshtein distance plus small
//! boosts for prefix and word-boundary hits, capped at 1.0.

use std::cmp::Ordering;

use crate::models::FuzzyMatch;

/// Classic edit distance over chars (insert, delete, substitute all cost 1)
pub use strsim::levenshtein;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const PREFIX_BOOST: f64 = 0.3;
pub const WORD_BOUNDARY_BOOST: f64 = 0.2;

/// Holds the result limit and minimum score used by [`find_matches`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    pub max_results: usize,
    pub threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(max_results: usize, threshold: f64) -> Self {
        Self {
            max_results,
            threshold,
        }
    }

    pub fn find_matches<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Vec<FuzzyMatch> {
        find_matches(query, candidates, self.max_results, self.threshold)
    }
}

/// Scores every non-empty candidate against `query` and returns the best
/// `max_results` at or above `threshold`, highest score first and shorter
/// candidates first on ties.
pub fn find_matches<S: AsRef<str>>(
    query: &str,
    candidates: &[S],
    max_results: usize,
    threshold: f64,
) -> Vec<FuzzyMatch> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(FuzzyMatch, usize)> = candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| !candidate.trim().is_empty())
        .filter_map(|candidate| {
            let score = score(&query, &candidate.to_lowercase());
            (score >= threshold).then(|| {
                let fuzzy = FuzzyMatch {
                    text: candidate.to_string(),
                    score,
                    match_indices: match_indices(&query, candidate),
                };
                (fuzzy, candidate.chars().count())
            })
        })
        .collect();

    matches.sort_by(|(a, a_len), (b, b_len)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_len.cmp(b_len))
    });
    matches.truncate(max_results);

    matches.into_iter().map(|(m, _)| m).collect()
}

/// Boosted similarity of two already-lowercased strings, in `[0, 1]`
pub fn score(query: &str, candidate: &str) -> f64 {
    let mut score = similarity(query, candidate);

    if candidate.starts_with(query) {
        score += PREFIX_BOOST;
    }
    if candidate.contains(&format!(" {query}")) || candidate.contains(&format!("{query} ")) {
        score += WORD_BOUNDARY_BOOST;
    }

    score.min(1.0)
}

/// `1 - distance / max(len)`, with two empty strings counting as identical
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Greedy left-to-right alignment of the (lowercased) query's chars into
/// `text`. Positions are char indices into `text` as given. Highlighting
/// only; not the edit-distance alignment.
pub fn match_indices(query: &str, text: &str) -> Vec<usize> {
    let mut wanted = query.chars().peekable();
    let mut indices = Vec::new();

    for (index, c) in text.chars().enumerate() {
        let Some(&next) = wanted.peek() else {
            break;
        };
        if c.to_lowercase().eq(next.to_lowercase()) {
            indices.push(index);
            wanted.next();
        }
    }

    indices
}

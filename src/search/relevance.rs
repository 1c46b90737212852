//! Keyword relevance scoring over a [`Collection`].
//!
//! Matching is plain case-insensitive substring search, not token
//! boundaries: `cream` matches `Screaming`.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::models::{Collection, SearchResult, Song};

pub const TITLE_WEIGHT: f64 = 10.0;
pub const ARTIST_WEIGHT: f64 = 8.0;
pub const CONTENT_OCCURRENCE_WEIGHT: f64 = 0.5;
pub const TAG_WEIGHT: f64 = 3.0;

/// A lowercased query split into terms, with one matcher per term
#[derive(Debug)]
pub struct ParsedQuery {
    phrase: String,
    terms: Vec<Term>,
}

#[derive(Debug)]
struct Term {
    text: String,
    pattern: Option<Regex>,
}

impl Term {
    fn new(text: &str) -> Self {
        let pattern = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .map_err(|e| debug!("Patrón no compilable para '{}': {}", text, e))
            .ok();

        Self {
            text: text.to_string(),
            pattern,
        }
    }

    fn occurrences(&self, content: &str) -> usize {
        match &self.pattern {
            Some(pattern) => pattern.find_iter(content).count(),
            None => content.to_lowercase().matches(self.text.as_str()).count(),
        }
    }
}

impl ParsedQuery {
    /// Returns `None` for an empty or whitespace-only query
    pub fn parse(query: &str) -> Option<Self> {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return None;
        }

        let terms = phrase.split_whitespace().map(Term::new).collect();
        Some(Self { phrase, terms })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.text.as_str())
    }

    /// Scores one song and reports which terms it contains anywhere.
    ///
    /// `10·[title ⊇ query] + 8·[artist ⊇ query] + 0.5·Σ occurrences(term, content)
    /// + 3·|{tag ⊇ query}|`
    pub fn score(&self, song: &Song) -> (f64, Vec<String>) {
        let title = song.title.to_lowercase();
        let artist = song.artist.to_lowercase();
        let tags: Vec<String> = song.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0.0;
        if title.contains(&self.phrase) {
            score += TITLE_WEIGHT;
        }
        if artist.contains(&self.phrase) {
            score += ARTIST_WEIGHT;
        }

        let mut matched_terms: Vec<String> = Vec::new();
        for term in &self.terms {
            let occurrences = term.occurrences(&song.content);
            score += CONTENT_OCCURRENCE_WEIGHT * occurrences as f64;

            let found = occurrences > 0
                || title.contains(&term.text)
                || artist.contains(&term.text)
                || tags.iter().any(|t| t.contains(&term.text));
            if found && !matched_terms.contains(&term.text) {
                matched_terms.push(term.text.clone());
            }
        }

        let tag_hits = tags.iter().filter(|t| t.contains(&self.phrase)).count();
        score += TAG_WEIGHT * tag_hits as f64;

        (score, matched_terms)
    }
}

/// Ranks songs for `query`, returning at most `max_results`.
///
/// An empty query returns the first `max_results` songs unscored. Songs
/// scoring zero are dropped; equal scores keep collection order.
pub fn search_scored(collection: &Collection, query: &str, max_results: usize) -> Vec<SearchResult> {
    let Some(parsed) = ParsedQuery::parse(query) else {
        return collection
            .songs
            .iter()
            .take(max_results)
            .map(|song| SearchResult {
                song: song.clone(),
                relevance_score: 0.0,
                matched_terms: Vec::new(),
            })
            .collect();
    };

    let mut results: Vec<SearchResult> = collection
        .songs
        .iter()
        .filter_map(|song| {
            let (score, matched_terms) = parsed.score(song);
            (score > 0.0).then(|| SearchResult {
                song: song.clone(),
                relevance_score: score,
                matched_terms,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in collection order
    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results.truncate(max_results);

    debug!(
        "🔍 '{}': {} resultados (máx {})",
        parsed.phrase(),
        results.len(),
        max_results
    );
    results
}

pub fn search(collection: &Collection, query: &str, max_results: usize) -> Vec<Song> {
    search_scored(collection, query, max_results)
        .into_iter()
        .map(|r| r.song)
        .collect()
}

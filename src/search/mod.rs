//! Search over the lyrics corpus.
//!
//! [`relevance`] ranks collection songs for a keyword query; [`fuzzy`]
//! scores arbitrary strings (usually song titles) against an imprecise one.

pub mod fuzzy;
pub mod relevance;

pub use fuzzy::FuzzyMatcher;
pub use relevance::ParsedQuery;

//! # Lyrics Index
//!
//! Indexing and search over a directory of plain-text song lyrics.
//!
//! - [`catalog`]: infers title/artist/album/tags per file and builds a
//!   [`models::Collection`], persisted as one JSON snapshot
//! - [`storage`]: lazily loads or regenerates that snapshot, single-flight
//! - [`search`]: weighted keyword ranking and Levenshtein fuzzy matching
//! - [`cache`]: TTL memoization with prefix invalidation
//! - [`library`]: the operations a front end calls (search, song lookup,
//!   artists, albums, stats, suggestions, regenerate)

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod search;
pub mod storage;

pub use error::{LyricsError, Result};
pub use library::LyricsLibrary;

//! # Catalog Module
//!
//! Turns a flat directory of lyrics text files into a [`Collection`].
//!
//! - [`inferencer`]: pure filename/content rules for title, artist, album,
//!   tags and word count
//! - [`ingestor`]: directory walk, per-file parsing and JSON persistence
//!
//! A file that cannot be read as UTF-8 is logged and skipped; only a
//! missing source directory aborts a regeneration.
//!
//! [`Collection`]: crate::models::Collection

pub mod inferencer;
pub mod ingestor;

pub use ingestor::{CollectionSource, CorpusIngestor};

//! Error types for the lyrics index.
//!
//! Parse-level failures are contained by the ingestor; everything else
//! propagates to the immediate caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LyricsError {
    /// The ingestion source directory does not exist
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A single lyrics file could not be read as UTF-8 text
    #[error("Failed to parse {}: {reason}", path.display())]
    FileParse { path: PathBuf, reason: String },

    /// The persisted collection file is malformed
    #[error("Malformed collection file {}: {source}", path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Song not found: {0}")]
    SongNotFound(String),
}

pub type Result<T> = std::result::Result<T, LyricsError>;

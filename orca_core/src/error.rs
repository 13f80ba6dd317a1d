//! Error types for loading sighting snapshots.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a [`SightingSource`](crate::source::SightingSource).
///
/// Malformed individual records are not errors; they are skipped or trimmed
/// while loading. These variants cover a snapshot that cannot be read at all.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid sightings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

//! Errors surfaced by the replay CLI.

use orca_core::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The playback channel closed before the requested ticks were produced
    #[error("Playback ended after {0} frames")]
    PlaybackEnded(usize),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

//! Error types for the replay environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The frame receiver went away, so the timer has nobody to feed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl EnvError {
    /// Creates a channel-closed error.
    pub fn closed(what: impl std::fmt::Display) -> Self {
        Self::ChannelClosed(what.to_string())
    }
}

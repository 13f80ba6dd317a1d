//! Common types for the replay environment abstraction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one playback session in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Log lines only need the first group
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

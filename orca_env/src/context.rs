//! Core environment context trait for replay sessions.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::task::TaskHandle;

/// The central interface for environment interaction.
///
/// This trait abstracts the clock and the task scheduler so that playback
/// sessions can run against the real runtime or a paused test clock.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time` and `tokio::spawn`
#[async_trait]
pub trait ReplayContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task and returns the handle that owns it.
    ///
    /// Dropping the handle does not stop the task; call
    /// [`TaskHandle::abort`] for that.
    fn spawn<F>(&self, name: &str, future: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static;
}

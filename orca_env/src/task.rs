//! Owned handles to spawned background tasks.

use tokio::task::JoinHandle;

/// Handle to a task spawned through a [`ReplayContext`](crate::ReplayContext).
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    inner: JoinHandle<()>,
}

impl TaskHandle {
    /// Wraps a tokio join handle.
    pub fn new(name: impl Into<String>, inner: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    /// Returns the task name given at spawn time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cancels the task at its next await point.
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Returns true once the task has completed or been aborted.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

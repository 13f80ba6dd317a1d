//! Orca Replay Environment Abstraction Layer
//!
//! This crate intercepts the two sources of non-determinism a playback
//! session touches:
//! - Time (`now()`, `sleep()`)
//! - Task scheduling (`spawn()` returning an owned, abortable handle)
//!
//! Running the tokio implementation on a paused runtime makes timer-driven
//! playback reproducible in tests.
//!
//! # Example
//!
//! ```ignore
//! use orca_env::{ReplayContext, TokioContext};
//!
//! let ctx = TokioContext::shared();
//! let handle = ctx.spawn("ticker", async move {
//!     loop {
//!         ctx.sleep(Duration::from_millis(250)).await;
//!         tick();
//!     }
//! });
//! handle.abort();
//! ```

mod context;
mod error;
mod task;
mod tokio_impl;
mod types;

pub use context::ReplayContext;
pub use error::EnvError;
pub use task::TaskHandle;
pub use tokio_impl::TokioContext;
pub use types::SessionId;

//! Orca Replay - command-line playback of sighting snapshots.
//!
//! The binary loads a JSON snapshot through a [`SightingSource`], then
//! either resolves a single day or plays the timeline for a number of ticks.
//! This library half holds the pieces the binary and its tests share.
//!
//! [`SightingSource`]: orca_core::SightingSource

mod error;
pub mod report;

pub use error::ReplayError;

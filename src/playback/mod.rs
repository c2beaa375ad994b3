//! Audio playback collaborator and the clock built on top of it.
//!
//! Decoding and output are delegated to a [`Player`]; this module only
//! cares about when playback starts, when it stops, and how far it got.

mod clock;
mod process;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub use clock::{ClockSignal, PlaybackClock};
pub use process::ProcessPlayer;

/// Player state as reported through [`AppEvent::Playback`](crate::events::AppEvent::Playback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Stopped,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Failed to start player '{program}' for '{path}': {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Player is already playing")]
    AlreadyPlaying,
}

/// External playback engine.
///
/// State transitions are not returned from these calls; implementations
/// push them onto the event channel so they stay ordered with keypresses.
pub trait Player {
    fn play(&mut self, path: &Path) -> Result<(), PlayerError>;

    /// How far playback has progressed. Zero until audio actually played.
    fn position(&self) -> Duration;

    fn stop(&mut self);
}

/// Monotonic time provider for the playback stopwatch.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Monotonic;

impl TimeSource for Monotonic {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

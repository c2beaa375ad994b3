//! Intents for the recording session.

use crate::mvi::Intent;

use super::log::KeyEventRecord;
use super::state::{FinishReason, SaveOutcome};

#[derive(Debug)]
pub enum SessionIntent {
    /// Playback clock started.
    PlaybackStarted,

    /// A key was consumed, already stamped with the clock's elapsed time.
    KeyPressed(KeyEventRecord),

    /// Stop accepting keys.
    Finish(FinishReason),

    /// The chart write was attempted, successfully or not.
    SaveAttempted(SaveOutcome),
}

impl Intent for SessionIntent {}

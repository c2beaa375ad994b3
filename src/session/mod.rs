//! Recording session feature module.
//!
//! Owns the keypress log and decides, from the session state alone,
//! whether a key is recorded or dropped.
//!
//! # Architecture
//!
//! - `state.rs` - Lifecycle state enum (WaitingForPlayback → Recording → Finalizing → Saved)
//! - `intent.rs` - Events (PlaybackStarted, KeyPressed, Finish, SaveAttempted)
//! - `reducer.rs` - State transitions (pure, no side effects)
//! - `log.rs` - The append-only record of accepted keys

mod intent;
mod log;
mod reducer;
mod state;

pub use intent::SessionIntent;
pub use log::{KeyEventRecord, RecordingLog};
pub use reducer::SessionReducer;
pub use state::{FinishReason, SaveOutcome, SessionPhase, SessionState};

use term_input::KeyCode;

use crate::chart::ChartWriter;
use crate::mvi::Reducer;

/// Session driven by the coordinator thread.
///
/// Wraps [`SessionReducer`] and performs its one side effect: writing the
/// chart exactly once on the way from Finalizing to Saved.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: SessionState,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn log(&self) -> Option<&RecordingLog> {
        self.state.log()
    }

    fn dispatch(&mut self, intent: SessionIntent) -> SessionPhase {
        let before = self.state.phase();
        let state = std::mem::take(&mut self.state);
        self.state = SessionReducer::reduce(state, intent);
        let after = self.state.phase();
        if before != after {
            tracing::debug!("Session {:?} -> {:?}", before, after);
        }
        after
    }

    /// Arms recording. Returns false if the session was not waiting.
    pub fn start(&mut self) -> bool {
        let before = self.phase();
        self.dispatch(SessionIntent::PlaybackStarted) != before
    }

    /// Appends the key if recording; returns the record that was stored.
    pub fn record_key(&mut self, key: KeyCode, timestamp_ms: i64) -> Option<KeyEventRecord> {
        if self.phase() != SessionPhase::Recording {
            tracing::trace!("Dropped key {} ({:?})", key, self.phase());
            return None;
        }
        let record = KeyEventRecord { timestamp_ms, key };
        self.dispatch(SessionIntent::KeyPressed(record));
        tracing::debug!("Logged key {} at {} ms", key, timestamp_ms);
        Some(record)
    }

    /// Stops accepting keys. Returns false if the session was not recording.
    pub fn finish(&mut self, reason: FinishReason) -> bool {
        let before = self.phase();
        self.dispatch(SessionIntent::Finish(reason)) != before
    }

    /// Writes the chart if finalizing; `None` in every other state.
    ///
    /// Reaches Saved whatever the write outcome, so shutdown can proceed.
    pub fn save(&mut self, writer: &ChartWriter) -> Option<SaveOutcome> {
        let SessionState::Finalizing { log, .. } = &self.state else {
            return None;
        };

        tracing::info!("Saving chart to {}", writer.path().display());
        let outcome = match writer.write(log) {
            Ok(notes) => {
                tracing::info!("Successfully saved {} notes", notes);
                SaveOutcome::Written { notes }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                SaveOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };
        self.dispatch(SessionIntent::SaveAttempted(outcome.clone()));
        Some(outcome)
    }
}

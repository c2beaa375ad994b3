//! State for the recording session.

use crate::mvi::MachineState;

use super::log::RecordingLog;

/// Why recording ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The player stopped after playing some audio.
    NaturalCompletion,
    /// Ctrl+C, SIGTERM, or any other quit request.
    Interrupted,
    /// The tty went away.
    InputClosed,
}

/// Result of the single chart write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { notes: usize },
    Failed { message: String },
}

/// Recording lifecycle: WaitingForPlayback → Recording → Finalizing → Saved.
///
/// Only `Recording` accepts keys, so anything arriving before playback or
/// after finish is dropped by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    WaitingForPlayback,

    Recording {
        log: RecordingLog,
    },

    Finalizing {
        log: RecordingLog,
        reason: FinishReason,
    },

    Saved {
        log: RecordingLog,
        outcome: SaveOutcome,
    },
}

impl MachineState for SessionState {}

/// Fieldless view of [`SessionState`] for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    WaitingForPlayback,
    Recording,
    Finalizing,
    Saved,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::WaitingForPlayback => SessionPhase::WaitingForPlayback,
            Self::Recording { .. } => SessionPhase::Recording,
            Self::Finalizing { .. } => SessionPhase::Finalizing,
            Self::Saved { .. } => SessionPhase::Saved,
        }
    }

    pub fn log(&self) -> Option<&RecordingLog> {
        match self {
            Self::WaitingForPlayback => None,
            Self::Recording { log } | Self::Finalizing { log, .. } | Self::Saved { log, .. } => {
                Some(log)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_waiting() {
        let state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::WaitingForPlayback);
        assert!(state.log().is_none());
    }

    #[test]
    fn phases_are_ordered_like_the_lifecycle() {
        assert!(SessionPhase::WaitingForPlayback < SessionPhase::Recording);
        assert!(SessionPhase::Recording < SessionPhase::Finalizing);
        assert!(SessionPhase::Finalizing < SessionPhase::Saved);
    }
}

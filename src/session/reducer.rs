//! Reducer for the recording session.

use crate::mvi::Reducer;

use super::intent::SessionIntent;
use super::state::SessionState;

/// Session state transitions.
///
/// Pure: the chart write itself happens in
/// [`RecordingSession::save`](super::RecordingSession::save) around the
/// `SaveAttempted` dispatch. Intents that do not apply to the current
/// state leave it unchanged.
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Intent = SessionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SessionIntent::PlaybackStarted => match state {
                SessionState::WaitingForPlayback => SessionState::Recording {
                    log: Default::default(),
                },
                other => other,
            },

            SessionIntent::KeyPressed(record) => match state {
                SessionState::Recording { mut log } => {
                    log.push(record);
                    SessionState::Recording { log }
                }
                other => other,
            },

            SessionIntent::Finish(reason) => match state {
                SessionState::Recording { log } => SessionState::Finalizing { log, reason },
                other => other,
            },

            SessionIntent::SaveAttempted(outcome) => match state {
                SessionState::Finalizing { log, .. } => SessionState::Saved { log, outcome },
                other => other,
            },
        }
    }
}

use term_input::KeyCode;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::playback::PlaybackState;

/// Everything the coordinator reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A key was read from the tty.
    Key(KeyCode),
    /// The player reported a state transition.
    Playback(PlaybackState),
    /// The tty reached EOF or failed; no more keys will arrive.
    InputClosed,
}

pub type EventSender = UnboundedSender<AppEvent>;
pub type EventReceiver = UnboundedReceiver<AppEvent>;

/// Single-consumer FIFO shared by the input thread and the player.
///
/// Unbounded so a burst of keys is never dropped while the coordinator
/// is busy.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

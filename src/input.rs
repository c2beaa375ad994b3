//! Background keyboard capture.
//!
//! The reader thread never touches session state: it only turns tty bytes
//! into [`AppEvent::Key`] messages on the coordinator's channel.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use term_input::{KeyCode, TtyReader};

use crate::events::{AppEvent, EventSender};
use crate::shutdown::ShutdownHandle;

/// Blocking source of key codes with a bounded wait.
pub trait KeySource: Send + 'static {
    /// Returns `Ok(None)` when nothing arrived within `timeout`.
    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>>;
}

impl KeySource for TtyReader {
    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        self.read(timeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Joined,
    /// The thread did not exit in time and was detached.
    Abandoned,
}

pub struct RawInputReader {
    shutdown: ShutdownHandle,
    done: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl RawInputReader {
    pub fn spawn<S: KeySource>(
        source: S,
        events: EventSender,
        shutdown: ShutdownHandle,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        // Dropped when the thread exits, even by panic
        let (done_tx, done) = mpsc::channel::<()>();
        let thread_shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name("raw-input".to_string())
            .spawn(move || {
                let _done = done_tx;
                read_loop(source, events, thread_shutdown, poll_interval);
            })?;

        Ok(Self {
            shutdown,
            done,
            handle: Some(handle),
        })
    }

    /// Requests interruption and waits up to `timeout` for the thread.
    pub fn stop(mut self, timeout: Duration) -> StopOutcome {
        self.shutdown.signal();
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                tracing::debug!("Input thread stopped");
                StopOutcome::Joined
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Input thread did not stop within {} ms, abandoning it",
                    timeout.as_millis()
                );
                StopOutcome::Abandoned
            }
        }
    }
}

fn read_loop<S: KeySource>(
    mut source: S,
    events: EventSender,
    shutdown: ShutdownHandle,
    poll_interval: Duration,
) {
    loop {
        if shutdown.is_shutting_down() {
            break;
        }

        match source.read_key(poll_interval) {
            Ok(Some(key)) => {
                if events.send(AppEvent::Key(key)).is_err() {
                    // Coordinator is gone
                    break;
                }
            }
            Ok(None) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("Input closed");
                let _ = events.send(AppEvent::InputClosed);
                break;
            }
            Err(err) => {
                tracing::error!("Keyboard read failed: {}", err);
                let _ = events.send(AppEvent::InputClosed);
                break;
            }
        }
    }
}

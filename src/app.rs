//! Main coordination loop.
//!
//! Everything that mutates the recording lives on this task: events from
//! the input thread and the player arrive through one FIFO channel and are
//! applied here in order.

use std::ops::ControlFlow;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use crossterm::style::Stylize;
use term_input::TtyReader;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

use crate::chart::{ChartWriter, LaneMap};
use crate::config::Config;
use crate::events::{self, AppEvent, EventReceiver};
use crate::input::RawInputReader;
use crate::playback::{ClockSignal, Monotonic, PlaybackClock, Player, ProcessPlayer, TimeSource};
use crate::session::{FinishReason, RecordingSession, SaveOutcome, SessionPhase};
use crate::shutdown::{ShutdownCoordinator, ShutdownHandle, ShutdownPhase};
use crate::terminal_guard::{TermiosConsole, TerminalModeGuard};

/// Owns the clock, the session and the writer; applies events to them.
pub struct Coordinator<P, T = Monotonic> {
    clock: PlaybackClock<P, T>,
    session: RecordingSession,
    writer: ChartWriter,
}

impl<P: Player, T: TimeSource> Coordinator<P, T> {
    pub fn new(clock: PlaybackClock<P, T>, writer: ChartWriter) -> Self {
        Self {
            clock,
            session: RecordingSession::new(),
            writer,
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn clock(&self) -> &PlaybackClock<P, T> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock<P, T> {
        &mut self.clock
    }

    /// Applies one event. Breaks with the reason recording should end.
    pub fn handle_event(&mut self, event: AppEvent) -> ControlFlow<FinishReason> {
        match event {
            AppEvent::Key(key) => {
                // Sampled at consumption; 0 only reaches a session that drops it
                let timestamp_ms = self.clock.elapsed_ms().unwrap_or(0);
                self.session.record_key(key, timestamp_ms);
                ControlFlow::Continue(())
            }
            AppEvent::Playback(state) => match self.clock.on_state_changed(state) {
                ClockSignal::Started => {
                    self.session.start();
                    ControlFlow::Continue(())
                }
                ClockSignal::NaturalCompletion => {
                    ControlFlow::Break(FinishReason::NaturalCompletion)
                }
                ClockSignal::Ignored => ControlFlow::Continue(()),
            },
            AppEvent::InputClosed => ControlFlow::Break(FinishReason::InputClosed),
        }
    }

    /// Consumes events until playback completes, input closes or shutdown
    /// is signaled.
    pub async fn run(
        &mut self,
        events: &mut EventReceiver,
        shutdown: &ShutdownHandle,
    ) -> FinishReason {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let ControlFlow::Break(reason) = self.handle_event(event) {
                            return reason;
                        }
                    }
                    None => return FinishReason::InputClosed,
                },
                _ = shutdown.wait() => return FinishReason::Interrupted,
            }
        }
    }

    /// Stops accepting keys. Anything still queued is dropped from here on.
    pub fn finish(&mut self, reason: FinishReason) {
        if self.session.finish(reason) {
            tracing::info!("Recording finished ({:?})", reason);
        } else if self.session.phase() == SessionPhase::WaitingForPlayback {
            tracing::info!("Playback never started, no chart will be written");
        }
    }

    /// Writes the chart if a recording was finished; at most once.
    pub fn save(&mut self) -> Option<SaveOutcome> {
        self.session.save(&self.writer)
    }
}

/// Runs a full recording: raw mode, input thread, playback, save, teardown.
pub async fn run(audio: &Path, output: &Path, config: &Config) -> anyhow::Result<ExitCode> {
    if !audio.exists() {
        tracing::error!("Audio file does not exist at path: {}", audio.display());
        return Ok(ExitCode::FAILURE);
    }

    let reader = TtyReader::open().context("Failed to open terminal for key input")?;
    let console =
        TermiosConsole::from_fd(reader.fd()).context("Failed to duplicate terminal handle")?;
    let mut guard = TerminalModeGuard::acquire(console)?;
    guard.install_panic_hook();
    tracing::info!("Terminal raw input enabled");

    let shutdown = ShutdownCoordinator::new();
    let (tx, mut rx) = events::channel();

    // Nothing fallible past this point: every path reaches the teardown below
    let signals = spawn_signal_listener(shutdown.handle());
    let input = match RawInputReader::spawn(
        reader,
        tx.clone(),
        shutdown.handle(),
        config.input.poll_interval(),
    ) {
        Ok(input) => Some(input),
        Err(err) => {
            tracing::error!("Failed to start input thread: {}", err);
            None
        }
    };

    let player = ProcessPlayer::new(config.player.clone(), tx);
    let mut coordinator = Coordinator::new(PlaybackClock::new(player), ChartWriter::new(output));
    let mut exit = ExitCode::SUCCESS;

    let reason = if input.is_none() {
        exit = ExitCode::FAILURE;
        FinishReason::InputClosed
    } else {
        print_banner(audio);
        match coordinator.clock_mut().play(audio) {
            Ok(()) => coordinator.run(&mut rx, &shutdown.handle()).await,
            Err(err) => {
                tracing::error!("{}", err);
                exit = ExitCode::FAILURE;
                FinishReason::Interrupted
            }
        }
    };
    coordinator.finish(reason);

    shutdown.signal();
    shutdown.advance(ShutdownPhase::StoppingInput);
    if let Some(input) = input {
        input.stop(config.shutdown.reader_join_timeout());
    }

    shutdown.advance(ShutdownPhase::StoppingPlayback);
    coordinator.clock_mut().stop();

    shutdown.advance(ShutdownPhase::SavingChart);
    coordinator.save();

    shutdown.advance(ShutdownPhase::RestoringTerminal);
    match guard.release() {
        Ok(()) => tracing::info!("Terminal mode restored"),
        Err(err) => tracing::warn!("Failed to restore terminal mode: {}", err),
    }
    drop(guard);

    if let Some(signals) = signals {
        signals.abort();
    }
    shutdown.advance(ShutdownPhase::Complete);
    Ok(exit)
}

/// Turns SIGINT/SIGTERM into a shutdown signal.
///
/// Both handlers are registered before this returns, so a signal arriving
/// before the listener task is first polled is still caught.
fn spawn_signal_listener(shutdown: ShutdownHandle) -> Option<JoinHandle<()>> {
    let streams = signal(SignalKind::interrupt())
        .and_then(|sigint| Ok((sigint, signal(SignalKind::terminate())?)));
    let (mut sigint, mut sigterm) = match streams {
        Ok(streams) => streams,
        Err(err) => {
            tracing::warn!("Failed to install signal handlers: {}", err);
            return None;
        }
    };
    Some(tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::info!("Interrupted, stopping"),
            _ = sigterm.recv() => tracing::info!("Terminated, stopping"),
        }
        shutdown.signal();
    }))
}

fn print_banner(audio: &Path) {
    let keys = LaneMap::keys()
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    eprintln!("{} {}", "Loading".bold(), audio.display());
    eprintln!(
        "Press keys ({}) to the rhythm. Press {} to stop and save.",
        keys.green(),
        "Ctrl+C".yellow()
    );
}

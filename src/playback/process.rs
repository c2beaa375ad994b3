use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::process::Command;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::{PlaybackState, Player, PlayerError};
use crate::config::PlayerConfig;
use crate::events::{AppEvent, EventSender};

#[derive(Debug, Default)]
struct Progress {
    started_at: Option<Instant>,
    /// Set once the child has exited.
    final_position: Option<Duration>,
}

/// Plays audio by running an external player (ffplay by default).
///
/// Must be used from inside a tokio runtime: the child is awaited on a
/// spawned task that reports Stopped when it exits.
pub struct ProcessPlayer {
    config: PlayerConfig,
    events: EventSender,
    progress: Arc<Mutex<Progress>>,
    cancel: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl ProcessPlayer {
    pub fn new(config: PlayerConfig, events: EventSender) -> Self {
        Self {
            config,
            events,
            progress: Arc::new(Mutex::new(Progress::default())),
            cancel: Arc::new(Notify::new()),
            task: None,
        }
    }
}

impl Player for ProcessPlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlayerError> {
        if self.task.is_some() {
            return Err(PlayerError::AlreadyPlaying);
        }

        // Own process group: Ctrl+C on the tty must reach us, not the player.
        // The player must never read from our tty either.
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(path)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                program: self.config.program.clone(),
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            "Started player '{}' (pid {:?})",
            self.config.program,
            child.id()
        );

        self.progress.lock().started_at = Some(Instant::now());
        let _ = self.events.send(AppEvent::Playback(PlaybackState::Playing));

        let progress = Arc::clone(&self.progress);
        let cancel = Arc::clone(&self.cancel);
        let events = self.events.clone();
        self.task = Some(tokio::spawn(async move {
            let finished_ok = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => true,
                    Ok(status) => {
                        tracing::warn!("Player exited with {}", status);
                        false
                    }
                    Err(err) => {
                        tracing::warn!("Failed to wait for player: {}", err);
                        false
                    }
                },
                _ = cancel.notified() => {
                    let _ = child.kill().await;
                    false
                }
            };

            {
                let mut progress = progress.lock();
                let ran = progress
                    .started_at
                    .map(|t| t.elapsed())
                    .unwrap_or_default();
                // A player that failed never advanced through the media
                progress.final_position = Some(if finished_ok { ran } else { Duration::ZERO });
            }
            let _ = events.send(AppEvent::Playback(PlaybackState::Stopped));
        }));

        Ok(())
    }

    fn position(&self) -> Duration {
        let progress = self.progress.lock();
        match (progress.final_position, progress.started_at) {
            (Some(position), _) => position,
            (None, Some(started_at)) => started_at.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    fn stop(&mut self) {
        if self.task.is_some() {
            self.cancel.notify_one();
        }
    }
}

//! Shared test doubles: a player driven by the test, a hand-cranked clock.

#![allow(dead_code, unused_imports)]

use chartmaker::app::Coordinator;
use chartmaker::chart::ChartWriter;
use chartmaker::events::{AppEvent, EventSender};
use chartmaker::playback::{PlaybackClock, PlaybackState, Player, PlayerError, TimeSource};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Player whose position and notifications are set by the test.
#[derive(Clone, Default)]
pub struct ScriptedPlayer {
    position: Arc<Mutex<Duration>>,
    played: Arc<Mutex<Vec<PathBuf>>>,
    stops: Arc<Mutex<usize>>,
    events: Option<EventSender>,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits Playing on the channel when `play` is called, like a real backend.
    pub fn with_events(events: EventSender) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn set_position_ms(&self, ms: u64) {
        *self.position.lock() = Duration::from_millis(ms);
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().clone()
    }

    pub fn stop_count(&self) -> usize {
        *self.stops.lock()
    }
}

impl Player for ScriptedPlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlayerError> {
        self.played.lock().push(path.to_path_buf());
        if let Some(events) = &self.events {
            let _ = events.send(AppEvent::Playback(PlaybackState::Playing));
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        *self.position.lock()
    }

    fn stop(&mut self) {
        *self.stops.lock() += 1;
    }
}

/// Monotonic time that only moves when the test says so.
#[derive(Clone)]
pub struct ManualTime {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn set_ms(&self, ms: u64) {
        *self.offset.lock() = Duration::from_millis(ms);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Coordinator wired to test doubles, writing to `output`.
pub fn coordinator(
    player: ScriptedPlayer,
    time: ManualTime,
    output: &Path,
) -> Coordinator<ScriptedPlayer, ManualTime> {
    Coordinator::new(
        PlaybackClock::with_time_source(player, time),
        ChartWriter::new(output),
    )
}

/// Reads the written chart back as (time, lane) pairs.
pub fn read_chart(path: &Path) -> Vec<(i64, u8)> {
    let content = std::fs::read_to_string(path).expect("chart should exist");
    let notes: Vec<serde_json::Value> = serde_json::from_str(&content).expect("valid JSON");
    notes
        .iter()
        .map(|note| {
            (
                note["time"].as_i64().expect("integer time"),
                note["lane"].as_u64().expect("integer lane") as u8,
            )
        })
        .collect()
}

use std::path::Path;
use std::time::Instant;

use super::{Monotonic, PlaybackState, Player, PlayerError, TimeSource};

/// What a playback transition means for the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// First Playing notification: the stopwatch is now running.
    Started,
    /// Stopped after a nonzero position.
    NaturalCompletion,
    Ignored,
}

/// Stopwatch started exactly once, when the player first reports Playing.
pub struct PlaybackClock<P, T = Monotonic> {
    player: P,
    time: T,
    started_at: Option<Instant>,
}

impl<P: Player> PlaybackClock<P, Monotonic> {
    pub fn new(player: P) -> Self {
        Self::with_time_source(player, Monotonic)
    }
}

impl<P: Player, T: TimeSource> PlaybackClock<P, T> {
    pub fn with_time_source(player: P, time: T) -> Self {
        Self {
            player,
            time,
            started_at: None,
        }
    }

    pub fn play(&mut self, path: &Path) -> Result<(), PlayerError> {
        self.player.play(path)
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn on_state_changed(&mut self, state: PlaybackState) -> ClockSignal {
        match state {
            PlaybackState::Playing => {
                if self.started_at.is_some() {
                    return ClockSignal::Ignored;
                }
                self.started_at = Some(self.time.now());
                tracing::info!("Music started. Start tapping!");
                ClockSignal::Started
            }
            PlaybackState::Stopped => {
                let position = self.player.position();
                if position.is_zero() {
                    tracing::debug!("Player stopped without playing anything");
                    return ClockSignal::Ignored;
                }
                tracing::info!("Music finished after {} ms", position.as_millis());
                ClockSignal::NaturalCompletion
            }
            PlaybackState::Idle => ClockSignal::Ignored,
        }
    }

    /// Milliseconds since playback started, `None` before it has.
    pub fn elapsed_ms(&self) -> Option<i64> {
        let started_at = self.started_at?;
        let elapsed = self.time.now().saturating_duration_since(started_at);
        Some(i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct StubPlayer {
        position: Duration,
        stopped: bool,
    }

    impl Player for StubPlayer {
        fn play(&mut self, _path: &Path) -> Result<(), PlayerError> {
            Ok(())
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    #[derive(Clone)]
    struct ManualTime {
        base: Instant,
        offset: Rc<Cell<Duration>>,
    }

    impl ManualTime {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Rc::new(Cell::new(Duration::ZERO)),
            }
        }

        fn set_ms(&self, ms: u64) {
            self.offset.set(Duration::from_millis(ms));
        }
    }

    impl TimeSource for ManualTime {
        fn now(&self) -> Instant {
            self.base + self.offset.get()
        }
    }

    #[test]
    fn elapsed_is_none_before_playing() {
        let clock = PlaybackClock::new(StubPlayer::default());
        assert!(!clock.is_started());
        assert_eq!(clock.elapsed_ms(), None);
    }

    #[test]
    fn first_playing_starts_stopwatch() {
        let time = ManualTime::new();
        let mut clock = PlaybackClock::with_time_source(StubPlayer::default(), time.clone());

        time.set_ms(400);
        assert_eq!(
            clock.on_state_changed(PlaybackState::Playing),
            ClockSignal::Started
        );
        time.set_ms(1400);
        assert_eq!(clock.elapsed_ms(), Some(1000));
    }

    #[test]
    fn second_playing_does_not_reset() {
        let time = ManualTime::new();
        let mut clock = PlaybackClock::with_time_source(StubPlayer::default(), time.clone());

        clock.on_state_changed(PlaybackState::Playing);
        time.set_ms(2000);
        assert_eq!(
            clock.on_state_changed(PlaybackState::Playing),
            ClockSignal::Ignored
        );
        assert_eq!(clock.elapsed_ms(), Some(2000));
    }

    #[test]
    fn stop_with_position_is_natural_completion() {
        let player = StubPlayer {
            position: Duration::from_millis(3000),
            ..Default::default()
        };
        let mut clock = PlaybackClock::new(player);
        clock.on_state_changed(PlaybackState::Playing);
        assert_eq!(
            clock.on_state_changed(PlaybackState::Stopped),
            ClockSignal::NaturalCompletion
        );
    }

    #[test]
    fn stop_at_zero_position_is_not_completion() {
        let mut clock = PlaybackClock::new(StubPlayer::default());
        assert_eq!(
            clock.on_state_changed(PlaybackState::Stopped),
            ClockSignal::Ignored
        );
        assert_eq!(
            clock.on_state_changed(PlaybackState::Idle),
            ClockSignal::Ignored
        );
    }

    #[test]
    fn stop_forwards_to_player() {
        let mut clock = PlaybackClock::new(StubPlayer::default());
        clock.stop();
        assert!(clock.player().stopped);
    }
}

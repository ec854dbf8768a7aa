//! Workout duration clock

use serde::{Deserialize, Serialize};

/// Wall-clock accumulator for the length of a workout
///
/// Only counts while running; pausing keeps the accumulated seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationClock {
    elapsed_secs: u64,
    running: bool,
}

impl DurationClock {
    /// Create a stopped clock at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stopped clock resuming from `elapsed_secs`
    #[inline]
    #[must_use]
    pub fn resume_from(elapsed_secs: u64) -> Self {
        Self {
            elapsed_secs,
            running: false,
        }
    }

    /// Start counting
    #[inline]
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop counting, keeping the accumulated time
    #[inline]
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Overwrite the accumulated time and stop the clock
    #[inline]
    pub fn reset(&mut self, to_secs: u64) {
        self.elapsed_secs = to_secs;
        self.running = false;
    }

    /// Advance by one second if running, returning the accumulated time
    pub fn tick(&mut self) -> u64 {
        if self.running {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
        self.elapsed_secs
    }

    /// Accumulated seconds
    #[inline]
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Whether the clock is counting
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_while_running() {
        let mut clock = DurationClock::new();
        assert_eq!(clock.tick(), 0);

        clock.start();
        clock.tick();
        clock.tick();
        assert_eq!(clock.elapsed_secs(), 2);

        clock.pause();
        clock.tick();
        assert_eq!(clock.elapsed_secs(), 2);
        assert!(!clock.is_running());
    }

    #[test]
    fn reset_stops_the_clock() {
        let mut clock = DurationClock::resume_from(30);
        clock.start();
        clock.reset(5);
        assert_eq!(clock.elapsed_secs(), 5);
        assert!(!clock.is_running());
    }
}

//! Rest countdown between sets
//!
//! Phases:
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --start--> Running
//! Running --tick reaches 0--> Alarm --tick / acknowledge--> Idle (default restored)
//! ```
//!
//! The transition into `Alarm` is reported exactly once as [`RestTick::Expired`].

use crate::error::TimerError;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the rest timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestPhase {
    /// Not counting, remaining time is the next countdown length
    Idle,
    /// Counting down
    Running,
    /// Stopped mid-countdown
    Paused,
    /// Countdown reached zero, waiting to be reset
    Alarm,
}

/// Result of advancing the rest timer by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// Timer was not running, nothing changed
    Idle,
    /// Still counting
    Counting {
        /// Seconds left
        remaining_secs: u32,
    },
    /// Countdown reached zero on this tick
    Expired,
    /// Alarm finished, timer restored to its default length
    Reset {
        /// Seconds the next countdown will run for
        remaining_secs: u32,
    },
}

/// Rest countdown with a configurable default length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestTimer {
    remaining_secs: u32,
    initial_secs: u32,
    default_secs: u32,
    phase: RestPhase,
}

impl RestTimer {
    /// Create an idle timer primed with `default_secs`
    ///
    /// # Errors
    /// `TimerError::ZeroDuration` when `default_secs` is zero
    pub fn new(default_secs: u32) -> Result<Self, TimerError> {
        if default_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        Ok(Self {
            remaining_secs: default_secs,
            initial_secs: default_secs,
            default_secs,
            phase: RestPhase::Idle,
        })
    }

    /// Start or resume the countdown
    ///
    /// Starting from `Alarm` first restores the default length.
    pub fn start(&mut self) {
        match self.phase {
            RestPhase::Idle | RestPhase::Paused => self.phase = RestPhase::Running,
            RestPhase::Alarm => {
                self.restore_default();
                self.phase = RestPhase::Running;
            }
            RestPhase::Running => {}
        }
    }

    /// Pause a running countdown
    #[inline]
    pub fn pause(&mut self) {
        if self.phase == RestPhase::Running {
            self.phase = RestPhase::Paused;
        }
    }

    /// Prime the next countdown with `to_secs` and go idle
    ///
    /// # Errors
    /// `TimerError::ZeroDuration` when `to_secs` is zero
    pub fn reset(&mut self, to_secs: u32) -> Result<(), TimerError> {
        if to_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        self.remaining_secs = to_secs;
        self.initial_secs = to_secs;
        self.phase = RestPhase::Idle;
        Ok(())
    }

    /// Change the length restored after each alarm
    ///
    /// An idle timer picks up the new length immediately.
    ///
    /// # Errors
    /// `TimerError::ZeroDuration` when `secs` is zero
    pub fn set_default(&mut self, secs: u32) -> Result<(), TimerError> {
        if secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        self.default_secs = secs;
        if self.phase == RestPhase::Idle {
            self.restore_default();
        }
        Ok(())
    }

    /// Advance by one second
    pub fn tick(&mut self) -> RestTick {
        match self.phase {
            RestPhase::Idle | RestPhase::Paused => RestTick::Idle,
            RestPhase::Running => {
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.phase = RestPhase::Alarm;
                    tracing::debug!("rest timer expired after {}s", self.initial_secs);
                    RestTick::Expired
                } else {
                    RestTick::Counting {
                        remaining_secs: self.remaining_secs,
                    }
                }
            }
            RestPhase::Alarm => {
                self.acknowledge();
                RestTick::Reset {
                    remaining_secs: self.remaining_secs,
                }
            }
        }
    }

    /// Leave the alarm (or any phase) and restore the default length
    pub fn acknowledge(&mut self) {
        self.restore_default();
        self.phase = RestPhase::Idle;
    }

    /// Share of the countdown still remaining, clamped to `[0, 1]`
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.initial_secs == 0 {
            return 0.0;
        }
        (f64::from(self.remaining_secs) / f64::from(self.initial_secs)).clamp(0.0, 1.0)
    }

    /// Seconds left in the current countdown
    #[inline]
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Length of the current countdown
    #[inline]
    #[must_use]
    pub fn initial_secs(&self) -> u32 {
        self.initial_secs
    }

    /// Length restored after an alarm
    #[inline]
    #[must_use]
    pub fn default_secs(&self) -> u32 {
        self.default_secs
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> RestPhase {
        self.phase
    }

    /// Whether ticks still change this timer (running or sounding the alarm)
    #[inline]
    #[must_use]
    pub fn needs_ticks(&self) -> bool {
        matches!(self.phase, RestPhase::Running | RestPhase::Alarm)
    }

    fn restore_default(&mut self) {
        self.remaining_secs = self.default_secs;
        self.initial_secs = self.default_secs;
    }
}

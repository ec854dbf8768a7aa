//! Free-running stopwatch
//!
//! Counts whole seconds upward while running and never goes backwards on
//! its own; only an explicit reset moves it.

use serde::{Deserialize, Serialize};

/// Count-up stopwatch with no terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed_secs: u64,
    running: bool,
}

impl Stopwatch {
    /// Create a stopped stopwatch at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting
    #[inline]
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop counting
    #[inline]
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and set the elapsed time
    #[inline]
    pub fn reset(&mut self, to_secs: u64) {
        self.elapsed_secs = to_secs;
        self.running = false;
    }

    /// Advance by one second if running
    pub fn tick(&mut self) -> u64 {
        if self.running {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
        self.elapsed_secs
    }

    /// Elapsed seconds
    #[inline]
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Whether the stopwatch is counting
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

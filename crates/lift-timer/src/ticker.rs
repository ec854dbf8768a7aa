//! Cancellable tickers
//!
//! A [`Ticker`] is a tokio task that sends a [`Tick`] over a channel at a
//! fixed period. It owns its task: cancelling or dropping the ticker aborts
//! it, so a ticker can never outlive the screen that started it.
//!
//! Aborting a task does not recall ticks it already queued. Every ticker in
//! a [`TickerSet`] gets a fresh generation, stamped on its ticks, and
//! [`TickerSet::is_live`] tells stale ticks apart from current ones.

use crate::error::TimerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Which timer a tick drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Workout duration clock
    Duration,
    /// Rest countdown
    Rest,
    /// Stopwatch
    Stopwatch,
}

impl TimerKind {
    /// Every timer kind
    pub const ALL: [TimerKind; 3] = [TimerKind::Duration, TimerKind::Rest, TimerKind::Stopwatch];
}

/// One period elapsed for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Timer this tick belongs to
    pub kind: TimerKind,
    /// Generation of the emitting ticker
    pub generation: u64,
    /// 1-based count of ticks sent by the emitting ticker
    pub sequence: u64,
}

/// Scheduled task emitting ticks for a single timer
#[derive(Debug)]
pub struct Ticker {
    kind: TimerKind,
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a ticker on the current tokio runtime
    ///
    /// The first tick fires one `period` after spawning. The task stops on
    /// its own once the receiving side of `sender` is dropped.
    ///
    /// # Errors
    /// `TimerError::ZeroPeriod` when `period` is zero
    pub fn spawn(
        kind: TimerKind,
        generation: u64,
        period: Duration,
        sender: mpsc::UnboundedSender<Tick>,
    ) -> Result<Self, TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sequence = 0u64;
            loop {
                interval.tick().await;
                sequence += 1;
                let tick = Tick {
                    kind,
                    generation,
                    sequence,
                };
                if sender.send(tick).is_err() {
                    tracing::debug!(?kind, "tick receiver dropped, stopping ticker");
                    break;
                }
            }
        });

        Ok(Self {
            kind,
            generation,
            handle,
        })
    }

    /// Timer this ticker drives
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Generation stamped on this ticker's ticks
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the ticker
    ///
    /// No new tick is produced afterwards, but ticks already queued on the
    /// channel stay there; filter them by generation.
    #[inline]
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the underlying task has stopped
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// At most one ticker per [`TimerKind`], all feeding the same channel
#[derive(Debug)]
pub struct TickerSet {
    period: Duration,
    sender: mpsc::UnboundedSender<Tick>,
    tickers: HashMap<TimerKind, Ticker>,
    next_generation: u64,
}

impl TickerSet {
    /// Create an empty set and the receiver its ticks arrive on
    ///
    /// # Errors
    /// `TimerError::ZeroPeriod` when `period` is zero
    pub fn new(period: Duration) -> Result<(Self, mpsc::UnboundedReceiver<Tick>), TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        Ok((
            Self {
                period,
                sender,
                tickers: HashMap::new(),
                next_generation: 1,
            },
            receiver,
        ))
    }

    /// Ensure a ticker runs for `kind`; no-op when one already does
    ///
    /// # Errors
    /// Propagates [`Ticker::spawn`] failures
    pub fn resume(&mut self, kind: TimerKind) -> Result<(), TimerError> {
        if self.tickers.contains_key(&kind) {
            return Ok(());
        }
        let generation = self.next_generation;
        let ticker = Ticker::spawn(kind, generation, self.period, self.sender.clone())?;
        self.next_generation += 1;
        tracing::trace!(?kind, generation, "ticker started");
        self.tickers.insert(kind, ticker);
        Ok(())
    }

    /// Replace the ticker for `kind` with a fresh one
    ///
    /// Ticks already queued by the old ticker become stale and the next
    /// tick arrives one full period from now.
    ///
    /// # Errors
    /// Propagates [`Ticker::spawn`] failures
    pub fn restart(&mut self, kind: TimerKind) -> Result<(), TimerError> {
        self.pause(kind);
        self.resume(kind)
    }

    /// Cancel the ticker for `kind`, if any
    pub fn pause(&mut self, kind: TimerKind) {
        if let Some(ticker) = self.tickers.remove(&kind) {
            ticker.cancel();
            tracing::trace!(?kind, "ticker cancelled");
        }
    }

    /// Cancel every ticker
    pub fn clear(&mut self) {
        for (_, ticker) in self.tickers.drain() {
            ticker.cancel();
        }
    }

    /// Whether a ticker runs for `kind`
    #[inline]
    #[must_use]
    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.tickers.contains_key(&kind)
    }

    /// Generation of the live ticker for `kind`
    #[inline]
    #[must_use]
    pub fn generation(&self, kind: TimerKind) -> Option<u64> {
        self.tickers.get(&kind).map(Ticker::generation)
    }

    /// Whether `tick` comes from the ticker currently live for its kind
    #[must_use]
    pub fn is_live(&self, tick: &Tick) -> bool {
        self.generation(tick.kind) == Some(tick.generation)
    }

    /// Number of live tickers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether no ticker is live
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl Drop for TickerSet {
    fn drop(&mut self) {
        self.clear();
    }
}

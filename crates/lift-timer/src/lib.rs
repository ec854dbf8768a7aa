//! Lift Timers
//!
//! One-second granularity timers used while a workout is in progress:
//!
//! - [`DurationClock`]: accumulates the workout duration
//! - [`RestTimer`]: countdown between sets with a terminal alarm phase
//! - [`Stopwatch`]: free-running count-up timer
//! - [`Ticker`] / [`TickerSet`]: cancellable scheduled tasks that emit [`Tick`]s
//!
//! The timer state types are plain values advanced by `tick()`. They never
//! spawn anything themselves; a [`TickerSet`] drives them from the tokio
//! runtime and is torn down explicitly with [`TickerSet::clear`].
//!
//! # Example
//!
//! ```rust
//! use lift_timer::{RestTick, RestTimer};
//!
//! let mut rest = RestTimer::new(120).unwrap();
//! rest.reset(2).unwrap();
//! rest.start();
//! assert_eq!(rest.tick(), RestTick::Counting { remaining_secs: 1 });
//! assert_eq!(rest.tick(), RestTick::Expired);
//! assert_eq!(rest.tick(), RestTick::Reset { remaining_secs: 120 });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod clock;
mod error;
mod rest;
mod stopwatch;
mod ticker;

pub use clock::DurationClock;
pub use error::TimerError;
pub use rest::{RestPhase, RestTick, RestTimer};
pub use stopwatch::Stopwatch;
pub use ticker::{Tick, Ticker, TickerSet, TimerKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

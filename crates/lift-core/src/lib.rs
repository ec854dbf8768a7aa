//! Lift Core - running a workout
//!
//! Builds on [`lift_session`] and [`lift_timer`] with everything needed to
//! drive a workout screen:
//!
//! - [`SessionStore`]: state container mutated only through [`Action`]s
//! - [`WorkoutController`]: tickers, feedback and backend calls around the store
//! - [`dto`]: typed records parsed from the backend's JSON
//! - [`ExerciseLibrary`]: custom and recently used exercises in local storage
//! - [`sim`]: scripted replay used by the `lift-sim` binary
//!
//! # Example
//!
//! ```rust
//! use lift_core::{Action, SessionStore, WorkoutConfig};
//! use lift_session::{ExerciseSpec, WorkoutSession};
//!
//! # fn main() -> Result<(), lift_core::CoreError> {
//! let mut store = SessionStore::new(WorkoutSession::new("Legs"), &WorkoutConfig::default())?;
//! store.dispatch(Action::AddExercise(ExerciseSpec::new("Squat").with_sets(3)))?;
//! assert_eq!(store.stats().total_sets, 3);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod controller;
pub mod dto;
pub mod error;
pub mod library;
pub mod logging;
pub mod service;
pub mod sim;
pub mod store;

pub use config::WorkoutConfig;
pub use controller::WorkoutController;
pub use dto::{CatalogExercise, FinishedExercise, FinishedSet, FinishedWorkout, Routine};
pub use error::{Alert, BoundaryError, CoreError, ServiceError};
pub use library::ExerciseLibrary;
pub use service::{FeedbackService, KeyValueStore, RemoteDataService, FALLBACK_PATTERN};
pub use store::{Action, SessionStore, StoreEvent, ValidationFlash};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

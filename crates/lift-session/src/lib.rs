//! Lift Session - the in-progress workout
//!
//! Owns everything a workout accumulates while it is being logged:
//! - Ordered exercises, each with ordered sets
//! - Superset grouping of exercises
//! - The workout duration clock
//! - Derived statistics (volume, completed sets, e1RM)
//!
//! All mutation goes through methods on [`WorkoutSession`]; the grouping is
//! one [`SupersetGroups`] value so membership and lookups cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use lift_session::{ExerciseSpec, SessionStats, SetPatch, WorkoutSession};
//!
//! # fn main() -> Result<(), lift_session::SessionError> {
//! let mut session = WorkoutSession::new("Push day");
//! let bench = session.add_exercise(ExerciseSpec::new("Bench Press").with_sets(1));
//! let set = session.exercise(bench).unwrap().sets[0].id;
//!
//! session.update_set(bench, set, SetPatch::new().weight(100.0).reps(10))?;
//! session.toggle_set_completion(bench, set)?;
//!
//! assert_eq!(SessionStats::compute(&session).total_volume, 1000.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod collection;
pub mod error;
pub mod ids;
pub mod model;
pub mod state_machine;
pub mod stats;
pub mod superset;

pub use error::{MissingFields, SessionError};
pub use ids::{CatalogId, ExerciseId, SessionId, SetId, SupersetId};
pub use model::{Exercise, ExercisePatch, ExerciseSpec, Rpe, Set, SetPatch, WorkoutSession};
pub use state_machine::SetState;
pub use stats::{estimated_1rm, ExerciseStats, SessionStats};
pub use superset::{SupersetGroups, SUPERSET_PALETTE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

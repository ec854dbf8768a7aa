//! Error types for session mutations
//!
//! Nothing here is fatal. Validation errors are surfaced to the user as a
//! short flash on the offending fields; lookup errors mean the caller held a
//! stale id and the mutation was dropped.

use crate::ids::{ExerciseId, SetId};
use crate::state_machine::SetState;
use serde::{Deserialize, Serialize};

/// Main session error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// A set cannot be completed until weight and reps are filled in
    #[error("set {set_id} is missing {missing}")]
    IncompleteSet {
        /// Exercise owning the set
        exercise_id: ExerciseId,
        /// The set that failed validation
        set_id: SetId,
        /// Fields that are empty or zero
        missing: MissingFields,
    },

    /// Exercise id not present in the session
    #[error("exercise not found: {0}")]
    ExerciseNotFound(ExerciseId),

    /// Set id not present in the exercise
    #[error("set {set_id} not found in exercise {exercise_id}")]
    SetNotFound {
        /// Exercise that was searched
        exercise_id: ExerciseId,
        /// Missing set
        set_id: SetId,
    },

    /// Reorder input was not a permutation of the current exercise ids
    #[error("reorder rejected: expected a permutation of {expected} exercises, got {actual} ids")]
    NotAPermutation {
        /// Number of exercises in the session
        expected: usize,
        /// Number of ids supplied
        actual: usize,
    },

    /// A new superset needs at least two distinct exercises
    #[error("a superset needs at least two exercises, got {0}")]
    SupersetTooSmall(usize),

    /// Exercise is not part of any superset
    #[error("exercise {0} is not in a superset")]
    NotInSuperset(ExerciseId),

    /// RPE outside 1-10
    #[error("RPE must be between 1 and 10, got {0}")]
    RpeOutOfRange(u8),

    /// Set state machine refused a transition
    #[error("illegal set transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: SetState,
        /// Requested state
        to: SetState,
    },

    /// Every superset id has been handed out
    #[error("no superset ids left")]
    SupersetIdsExhausted,

    /// A stored session could not be restored
    #[error("invalid stored session: {0}")]
    InvalidSession(String),

    /// Internal grouping bookkeeping is inconsistent
    #[error("superset invariant violated: {0}")]
    InvariantViolation(String),
}

impl SessionError {
    /// Whether this error should flash fields instead of being reported
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::IncompleteSet { .. } | Self::RpeOutOfRange(_))
    }
}

/// Which required set fields are empty or zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFields {
    /// Weight is null or zero
    pub weight: bool,
    /// Reps are null or zero
    pub reps: bool,
}

impl MissingFields {
    /// Whether nothing is missing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.weight && !self.reps
    }
}

impl std::fmt::Display for MissingFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.weight, self.reps) {
            (true, true) => f.write_str("weight and reps"),
            (true, false) => f.write_str("weight"),
            (false, true) => f.write_str("reps"),
            (false, false) => f.write_str("nothing"),
        }
    }
}

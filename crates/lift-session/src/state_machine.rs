//! Set lifecycle
//!
//! ```text
//! Incomplete --toggle (validated)--> Completed --toggle--> Incomplete
//! Incomplete | Completed --remove--> Deleted
//! ```

use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetState {
    /// Logged values may still change, not counted in stats
    Incomplete,
    /// Counted in volume and set totals
    Completed,
    /// Removed from its exercise
    Deleted,
}

impl SetState {
    /// State matching a set's completed flag
    #[inline]
    #[must_use]
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Incomplete
        }
    }
}

/// Validates a state transition.
pub fn validate_transition(from: SetState, to: SetState) -> Result<(), SessionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SessionError::IllegalTransition { from, to })
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: SetState) -> &'static [SetState] {
    use SetState::{Completed, Deleted, Incomplete};
    match from {
        Incomplete => &[Completed, Deleted],
        Completed => &[Incomplete, Deleted],
        Deleted => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_is_terminal() {
        assert!(allowed_transitions(SetState::Deleted).is_empty());
        assert!(validate_transition(SetState::Deleted, SetState::Incomplete).is_err());
    }

    #[test]
    fn toggle_both_ways() {
        assert!(validate_transition(SetState::Incomplete, SetState::Completed).is_ok());
        assert!(validate_transition(SetState::Completed, SetState::Incomplete).is_ok());
        assert!(validate_transition(SetState::Completed, SetState::Completed).is_err());
    }
}

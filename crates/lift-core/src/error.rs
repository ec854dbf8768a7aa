//! Error types for Lift Core
//!
//! Provides error handling for:
//! - Session mutations (validation and stale ids)
//! - Malformed records from the backend
//! - Backend and storage failures
//! - Configuration problems
//!
//! None of these are fatal. Backend failures become an [`Alert`] the user
//! can dismiss and retry from; validation failures only flash fields.

use lift_session::SessionError;
use lift_timer::TimerError;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Session mutation rejected
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Timer misconfigured
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    /// Backend returned a record we could not use
    #[error("malformed record: {0}")]
    Boundary(#[from] BoundaryError),

    /// Backend or storage call failed
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation needs an active session
    #[error("no active workout")]
    NoActiveSession,

    /// A session is already running
    #[error("a workout is already in progress")]
    SessionActive,
}

impl CoreError {
    /// Whether re-triggering the same action may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// Modal alert for errors the user must see
    ///
    /// Validation failures return `None`; they are shown as a field flash.
    #[must_use]
    pub fn alert(&self) -> Option<Alert> {
        match self {
            Self::Session(e) if e.is_validation() => None,
            Self::Service(e) => Some(Alert::new("Something went wrong", e.to_string()).retryable()),
            Self::Boundary(e) => Some(Alert::new("Unexpected data", e.to_string())),
            other => Some(Alert::new("Error", other.to_string())),
        }
    }
}

/// Backend record failed boundary validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    /// Record did not match the expected shape
    #[error("{entity}: {reason}")]
    Malformed {
        /// Kind of record
        entity: &'static str,
        /// Parser message
        reason: String,
    },

    /// Required text field was empty
    #[error("{entity}: field `{field}` is empty")]
    EmptyField {
        /// Kind of record
        entity: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Expected a list of records
    #[error("{entity}: expected an array of records")]
    NotAList {
        /// Kind of record
        entity: &'static str,
    },
}

/// Failure reported by an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Remote request failed or was rejected
    #[error("request failed: {0}")]
    Request(String),

    /// Record does not exist on the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// Local key-value storage failed
    #[error("storage failed: {0}")]
    Storage(String),

    /// Haptic or audio feedback failed
    #[error("feedback unavailable: {0}")]
    Feedback(String),
}

/// User-facing modal alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Short title
    pub title: String,
    /// Detail line
    pub message: String,
    /// Offer a retry button
    pub retryable: bool,
}

impl Alert {
    /// Create new alert
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Mark as retryable
    #[inline]
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

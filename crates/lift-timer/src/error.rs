//! Timer configuration errors

/// Errors raised when a timer is configured with unusable values
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// A countdown needs at least one second
    #[error("countdown duration must be at least one second")]
    ZeroDuration,

    /// A ticker cannot fire with a zero period
    #[error("ticker period must be non-zero")]
    ZeroPeriod,
}

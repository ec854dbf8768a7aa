//! External collaborators
//!
//! The core never talks to a network, a disk or a speaker directly. Each
//! collaborator is a trait object injected into the
//! [`WorkoutController`](crate::controller::WorkoutController).

use crate::error::ServiceError;
use serde_json::Value;

/// Vibration pattern used when the alarm sound cannot be played, in ms
pub const FALLBACK_PATTERN: &[u64] = &[0, 400, 200, 400];

/// Backend holding the exercise catalog, routines and workout history
#[async_trait::async_trait]
pub trait RemoteDataService: Send + Sync {
    /// List the exercise catalog
    async fn fetch_catalog(&self) -> Result<Value, ServiceError>;

    /// Fetch one routine by id
    async fn fetch_routine(&self, routine_id: &str) -> Result<Value, ServiceError>;

    /// Persist a finished workout
    async fn save_workout(&self, record: Value) -> Result<(), ServiceError>;
}

/// Local string key-value storage
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a key
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;

    /// Write a key
    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;

    /// Delete a key
    async fn remove(&self, key: &str) -> Result<(), ServiceError>;
}

/// Haptic and audio feedback
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedbackService: Send + Sync {
    /// Short confirmation when a set is marked done
    async fn set_completed(&self) -> Result<(), ServiceError>;

    /// Play the rest alarm once
    async fn rest_alarm(&self) -> Result<(), ServiceError>;

    /// Vibrate with an on/off pattern in milliseconds
    async fn vibrate(&self, pattern: Vec<u64>) -> Result<(), ServiceError>;
}

//! User exercise library
//!
//! Custom exercises and the recently used list live in local key-value
//! storage as JSON arrays of [`CatalogExercise`].

use crate::dto::CatalogExercise;
use crate::error::{BoundaryError, CoreError};
use crate::service::KeyValueStore;
use lift_session::CatalogId;
use std::sync::Arc;

/// Storage key for user-created exercises
pub const CUSTOM_KEY: &str = "lift.custom_exercises";

/// Storage key for the recently used list
pub const RECENT_KEY: &str = "lift.recent_exercises";

/// Custom and recently used exercises
#[derive(Clone)]
pub struct ExerciseLibrary {
    store: Arc<dyn KeyValueStore>,
    recent_limit: usize,
}

impl std::fmt::Debug for ExerciseLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseLibrary")
            .field("recent_limit", &self.recent_limit)
            .finish_non_exhaustive()
    }
}

impl ExerciseLibrary {
    /// Create a library over `store`
    pub fn new(store: Arc<dyn KeyValueStore>, recent_limit: usize) -> Self {
        Self { store, recent_limit }
    }

    /// Exercises the user created, oldest first
    ///
    /// # Errors
    /// Storage failure or a stored value that is not a valid list
    pub async fn custom_exercises(&self) -> Result<Vec<CatalogExercise>, CoreError> {
        self.load(CUSTOM_KEY).await
    }

    /// Create a custom exercise
    ///
    /// A name matching an existing custom exercise (ignoring case) returns
    /// that exercise instead of creating a duplicate.
    ///
    /// # Errors
    /// Empty name, or storage failure
    pub async fn add_custom_exercise(
        &self,
        name: &str,
        category: Option<String>,
    ) -> Result<CatalogExercise, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoundaryError::EmptyField {
                entity: "custom exercise",
                field: "name",
            }
            .into());
        }

        let mut custom = self.custom_exercises().await?;
        if let Some(existing) = custom.iter().find(|e| e.name.eq_ignore_ascii_case(name)) {
            return Ok(existing.clone());
        }

        let exercise = CatalogExercise {
            id: CatalogId::new(format!("custom-{}", ulid::Ulid::new())),
            name: name.to_string(),
            category,
            equipment: None,
            custom: true,
        };
        custom.push(exercise.clone());
        self.save(CUSTOM_KEY, &custom).await?;
        tracing::info!(id = %exercise.id, name = %exercise.name, "custom exercise created");
        Ok(exercise)
    }

    /// Most recently used first
    ///
    /// # Errors
    /// Storage failure or a stored value that is not a valid list
    pub async fn recent_exercises(&self) -> Result<Vec<CatalogExercise>, CoreError> {
        self.load(RECENT_KEY).await
    }

    /// Move `used` to the front of the recent list
    ///
    /// Entries keep the order given, duplicates are dropped and the list is
    /// capped at the configured limit.
    ///
    /// # Errors
    /// Storage failure
    pub async fn record_recent(&self, used: &[CatalogExercise]) -> Result<(), CoreError> {
        if used.is_empty() {
            return Ok(());
        }
        let previous = self.recent_exercises().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable recent list");
            Vec::new()
        });

        let mut merged: Vec<CatalogExercise> = Vec::with_capacity(self.recent_limit);
        for exercise in used.iter().chain(previous.iter()) {
            if merged.len() == self.recent_limit {
                break;
            }
            if !merged.iter().any(|m| m.id == exercise.id) {
                merged.push(exercise.clone());
            }
        }

        self.save(RECENT_KEY, &merged).await
    }

    /// Forget the recently used list
    ///
    /// # Errors
    /// Storage failure
    pub async fn clear_recent(&self) -> Result<(), CoreError> {
        self.store.remove(RECENT_KEY).await?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<CatalogExercise>, CoreError> {
        match self.store.get(key).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                CoreError::from(BoundaryError::Malformed {
                    entity: "stored exercise list",
                    reason: e.to_string(),
                })
            }),
        }
    }

    async fn save(&self, key: &str, list: &[CatalogExercise]) -> Result<(), CoreError> {
        let raw = serde_json::to_string(list).map_err(|e| BoundaryError::Malformed {
            entity: "stored exercise list",
            reason: e.to_string(),
        })?;
        self.store.set(key, raw).await?;
        Ok(())
    }
}

//! Backend record boundary
//!
//! The remote data service hands back loosely typed JSON. Everything is
//! parsed into typed records here and rejected early when malformed, so the
//! rest of the crate never sees a `serde_json::Value`.

use crate::error::BoundaryError;
use chrono::{DateTime, Utc};
use lift_session::{CatalogId, ExerciseSpec, SessionId, SessionStats, WorkoutSession};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend ids arrive as either strings or integers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    id: RawId,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    equipment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoutineRecord {
    id: RawId,
    name: String,
    #[serde(default)]
    exercises: Vec<RoutineExerciseRecord>,
}

#[derive(Debug, Deserialize)]
struct RoutineExerciseRecord {
    #[serde(default)]
    exercise_id: Option<RawId>,
    name: String,
    #[serde(default = "default_sets")]
    sets: u32,
    #[serde(default)]
    notes: Option<String>,
}

fn default_sets() -> u32 {
    1
}

/// Exercise available to add to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogExercise {
    /// Catalog id
    pub id: CatalogId,
    /// Display name
    pub name: String,
    /// Muscle group or category
    #[serde(default)]
    pub category: Option<String>,
    /// Required equipment
    #[serde(default)]
    pub equipment: Option<String>,
    /// Created by the user rather than the backend
    #[serde(default)]
    pub custom: bool,
}

impl CatalogExercise {
    /// Spec for adding this exercise to a session
    #[must_use]
    pub fn to_spec(&self) -> ExerciseSpec {
        ExerciseSpec::new(self.name.clone()).with_catalog_id(self.id.clone())
    }
}

/// Routine a session can be started from
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    /// Routine id
    pub id: String,
    /// Display name
    pub name: String,
    /// Planned exercises, in order
    pub exercises: Vec<ExerciseSpec>,
}

/// Parse the catalog listing
///
/// # Errors
/// `BoundaryError` when the value is not a list or any entry is malformed
pub fn parse_catalog(value: Value) -> Result<Vec<CatalogExercise>, BoundaryError> {
    const ENTITY: &str = "catalog exercise";

    let Value::Array(items) = value else {
        return Err(BoundaryError::NotAList { entity: ENTITY });
    };

    items
        .into_iter()
        .map(|item| {
            let record: CatalogRecord = from_value(ENTITY, item)?;
            Ok(CatalogExercise {
                id: CatalogId::new(record.id.into_string()),
                name: non_empty(ENTITY, "name", record.name)?,
                category: record.category,
                equipment: record.equipment,
                custom: false,
            })
        })
        .collect()
}

/// Parse a single routine
///
/// # Errors
/// `BoundaryError` when the record or any of its exercises is malformed
pub fn parse_routine(value: Value) -> Result<Routine, BoundaryError> {
    const ENTITY: &str = "routine";

    let record: RoutineRecord = from_value(ENTITY, value)?;
    let exercises = record
        .exercises
        .into_iter()
        .map(|ex| {
            let name = non_empty("routine exercise", "name", ex.name)?;
            let mut spec = ExerciseSpec::new(name).with_sets(ex.sets.max(1));
            if let Some(id) = ex.exercise_id {
                spec = spec.with_catalog_id(CatalogId::new(id.into_string()));
            }
            if let Some(notes) = ex.notes {
                spec = spec.with_notes(notes);
            }
            Ok(spec)
        })
        .collect::<Result<Vec<_>, BoundaryError>>()?;

    Ok(Routine {
        id: record.id.into_string(),
        name: non_empty(ENTITY, "name", record.name)?,
        exercises,
    })
}

fn from_value<T: serde::de::DeserializeOwned>(entity: &'static str, value: Value) -> Result<T, BoundaryError> {
    serde_json::from_value(value).map_err(|e| BoundaryError::Malformed {
        entity,
        reason: e.to_string(),
    })
}

fn non_empty(entity: &'static str, field: &'static str, value: String) -> Result<String, BoundaryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BoundaryError::EmptyField { entity, field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// A logged set as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedSet {
    /// Position among the exercise's completed sets
    pub order: u32,
    /// Load
    pub weight: Option<f64>,
    /// Repetitions
    pub reps: Option<u32>,
    /// Perceived exertion
    pub rpe: Option<u8>,
}

/// An exercise as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedExercise {
    /// Catalog id, if any
    pub exercise_id: Option<CatalogId>,
    /// Display name
    pub name: String,
    /// Position in the workout
    pub position: u32,
    /// Notes
    pub notes: Option<String>,
    /// Superset group number, if grouped
    pub superset: Option<u32>,
    /// Completed sets only
    pub sets: Vec<FinishedSet>,
}

/// Finished workout sent to the remote data service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedWorkout {
    /// Session id
    pub session_id: SessionId,
    /// Display name
    pub name: String,
    /// Routine the session was started from
    pub routine_id: Option<String>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Finish time
    pub finished_at: DateTime<Utc>,
    /// Active workout seconds
    pub duration_secs: u64,
    /// Σ weight × reps over completed sets
    pub total_volume: f64,
    /// Exercises with at least one completed set
    pub exercises: Vec<FinishedExercise>,
}

impl FinishedWorkout {
    /// Build the record from a session, keeping only completed sets
    #[must_use]
    pub fn from_session(session: &WorkoutSession, finished_at: DateTime<Utc>) -> Self {
        let stats = SessionStats::compute(session);
        let exercises = session
            .exercises()
            .iter()
            .filter(|ex| ex.completed_sets().next().is_some())
            .zip(0u32..)
            .map(|(ex, position)| FinishedExercise {
                exercise_id: ex.catalog_id.clone(),
                name: ex.name.clone(),
                position,
                notes: ex.notes.clone(),
                superset: session.supersets().group_of(ex.id).map(|g| g.0),
                sets: ex
                    .completed_sets()
                    .zip(0u32..)
                    .map(|(set, order)| FinishedSet {
                        order,
                        weight: set.weight,
                        reps: set.reps,
                        rpe: set.rpe.map(u8::from),
                    })
                    .collect(),
            })
            .collect();

        Self {
            session_id: session.id,
            name: session.name.clone(),
            routine_id: session.routine_id.clone(),
            started_at: session.started_at,
            finished_at,
            duration_secs: session.duration_secs(),
            total_volume: stats.total_volume,
            exercises,
        }
    }

    /// Exercise names in workout order
    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.name.as_str())
    }
}

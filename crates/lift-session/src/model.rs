//! Session data model
//!
//! A [`WorkoutSession`] exclusively owns its exercises, each [`Exercise`]
//! exclusively owns its sets. Field-level edits arrive as patches so callers
//! can distinguish "leave unchanged" from "clear".

use crate::error::{MissingFields, SessionError};
use crate::ids::{CatalogId, ExerciseId, SessionId, SetId};
use crate::superset::SupersetGroups;
use chrono::{DateTime, Utc};
use lift_timer::DurationClock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rate of perceived exertion, 1 (easy) to 10 (max effort)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rpe(u8);

impl Rpe {
    /// Validate and wrap an RPE value
    ///
    /// # Errors
    /// `SessionError::RpeOutOfRange` outside 1-10
    pub fn new(value: u8) -> Result<Self, SessionError> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SessionError::RpeOutOfRange(value))
        }
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rpe {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rpe> for u8 {
    fn from(rpe: Rpe) -> Self {
        rpe.0
    }
}

/// One logged (or planned) set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    /// Set id
    pub id: SetId,
    /// Load, in the user's unit
    pub weight: Option<f64>,
    /// Repetitions
    pub reps: Option<u32>,
    /// Perceived exertion
    pub rpe: Option<Rpe>,
    /// Whether the set was performed
    pub completed: bool,
    /// Position within the exercise, contiguous from 0
    pub order: u32,
}

impl Set {
    /// Create an empty, incomplete set at `order`
    #[inline]
    #[must_use]
    pub fn new(order: u32) -> Self {
        Self {
            id: SetId::new(),
            weight: None,
            reps: None,
            rpe: None,
            completed: false,
            order,
        }
    }

    /// Required fields that are null or zero
    #[must_use]
    pub fn missing_fields(&self) -> MissingFields {
        MissingFields {
            weight: !matches!(self.weight, Some(w) if w != 0.0),
            reps: !matches!(self.reps, Some(r) if r != 0),
        }
    }

    /// weight × reps, ignoring completion; zero when either is unset
    #[must_use]
    pub fn volume(&self) -> f64 {
        match (self.weight, self.reps) {
            (Some(weight), Some(reps)) => weight * f64::from(reps),
            _ => 0.0,
        }
    }
}

/// Field updates for a set; `None` leaves a field unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetPatch {
    /// New weight (`Some(None)` clears it)
    pub weight: Option<Option<f64>>,
    /// New reps (`Some(None)` clears them)
    pub reps: Option<Option<u32>>,
    /// New RPE (`Some(None)` clears it)
    pub rpe: Option<Option<Rpe>>,
}

impl SetPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight
    #[inline]
    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(Some(weight));
        self
    }

    /// Set the reps
    #[inline]
    #[must_use]
    pub fn reps(mut self, reps: u32) -> Self {
        self.reps = Some(Some(reps));
        self
    }

    /// Set the RPE
    #[inline]
    #[must_use]
    pub fn rpe(mut self, rpe: Rpe) -> Self {
        self.rpe = Some(Some(rpe));
        self
    }

    /// Clear the weight
    #[inline]
    #[must_use]
    pub fn clear_weight(mut self) -> Self {
        self.weight = Some(None);
        self
    }

    /// Clear the reps
    #[inline]
    #[must_use]
    pub fn clear_reps(mut self) -> Self {
        self.reps = Some(None);
        self
    }

    pub(crate) fn apply(&self, set: &mut Set) {
        if let Some(weight) = self.weight {
            set.weight = weight;
        }
        if let Some(reps) = self.reps {
            set.reps = reps;
        }
        if let Some(rpe) = self.rpe {
            set.rpe = rpe;
        }
    }
}

/// An exercise performed during the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Instance id, unique within the session
    pub id: ExerciseId,
    /// Catalog entry this instance was created from
    pub catalog_id: Option<CatalogId>,
    /// Display name
    pub name: String,
    /// Ordered sets
    pub sets: Vec<Set>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl Exercise {
    /// Look up a set
    #[must_use]
    pub fn set(&self, set_id: SetId) -> Option<&Set> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    /// Completed sets, in order
    pub fn completed_sets(&self) -> impl Iterator<Item = &Set> {
        self.sets.iter().filter(|s| s.completed)
    }
}

/// What to add when a new exercise joins the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    /// Display name
    pub name: String,
    /// Catalog entry, if picked from the catalog
    #[serde(default)]
    pub catalog_id: Option<CatalogId>,
    /// Number of empty sets to create
    #[serde(default = "ExerciseSpec::default_sets")]
    pub initial_sets: u32,
    /// Notes carried over from a routine
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExerciseSpec {
    /// Spec with one empty set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_id: None,
            initial_sets: Self::default_sets(),
            notes: None,
        }
    }

    /// With catalog id
    #[inline]
    #[must_use]
    pub fn with_catalog_id(mut self, id: CatalogId) -> Self {
        self.catalog_id = Some(id);
        self
    }

    /// With a number of empty sets
    #[inline]
    #[must_use]
    pub fn with_sets(mut self, sets: u32) -> Self {
        self.initial_sets = sets;
        self
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn default_sets() -> u32 {
        1
    }
}

/// Exercise-level edits; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExercisePatch {
    /// New display name
    pub name: Option<String>,
    /// New notes (`Some(None)` clears them)
    pub notes: Option<Option<String>>,
}

impl ExercisePatch {
    /// Patch setting the notes
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            name: None,
            notes: Some(Some(notes.into())),
        }
    }

    /// Patch renaming the exercise
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            notes: None,
        }
    }
}

/// An active workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRepr")]
pub struct WorkoutSession {
    /// Session id
    pub id: SessionId,
    /// Display name
    pub name: String,
    /// Routine this session was started from
    pub routine_id: Option<String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Workout duration clock
    pub clock: DurationClock,
    pub(crate) exercises: Vec<Exercise>,
    pub(crate) supersets: SupersetGroups,
}

impl WorkoutSession {
    /// Start an empty session now
    pub fn new(name: impl Into<String>) -> Self {
        Self::started_at(name, Utc::now())
    }

    /// Empty session with an explicit start time
    pub fn started_at(name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            routine_id: None,
            started_at,
            clock: DurationClock::new(),
            exercises: Vec::new(),
            supersets: SupersetGroups::new(),
        }
    }

    /// Record the routine this session came from
    #[inline]
    #[must_use]
    pub fn with_routine(mut self, routine_id: impl Into<String>) -> Self {
        self.routine_id = Some(routine_id.into());
        self
    }

    /// Exercises in display order
    #[inline]
    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Look up an exercise
    #[must_use]
    pub fn exercise(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Exercise ids in display order
    #[must_use]
    pub fn exercise_ids(&self) -> Vec<ExerciseId> {
        self.exercises.iter().map(|e| e.id).collect()
    }

    /// Superset grouping
    #[inline]
    #[must_use]
    pub fn supersets(&self) -> &SupersetGroups {
        &self.supersets
    }

    /// Accumulated workout seconds
    #[inline]
    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    /// Whether the duration clock is stopped
    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }
}

/// Number sets 0, 1, 2, ... in their current order
pub(crate) fn renumber(sets: &mut [Set]) {
    for (set, order) in sets.iter_mut().zip(0u32..) {
        set.order = order;
    }
}

/// Stored form of [`WorkoutSession`], checked before use
#[derive(Deserialize)]
struct SessionRepr {
    id: SessionId,
    name: String,
    routine_id: Option<String>,
    started_at: DateTime<Utc>,
    clock: DurationClock,
    exercises: Vec<Exercise>,
    supersets: SupersetGroups,
}

impl TryFrom<SessionRepr> for WorkoutSession {
    type Error = SessionError;

    /// Rejects duplicate exercise or set ids. Sets are renumbered by their
    /// stored order and superset members that are not in the session are
    /// dropped.
    fn try_from(repr: SessionRepr) -> Result<Self, Self::Error> {
        let mut exercise_ids = HashSet::new();
        let mut set_ids = HashSet::new();
        let mut exercises = repr.exercises;
        for exercise in &mut exercises {
            if !exercise_ids.insert(exercise.id) {
                return Err(SessionError::InvalidSession(format!(
                    "exercise {} appears twice",
                    exercise.id
                )));
            }
            for set in &exercise.sets {
                if !set_ids.insert(set.id) {
                    return Err(SessionError::InvalidSession(format!("set {} appears twice", set.id)));
                }
            }
            exercise.sets.sort_by_key(|set| set.order);
            renumber(&mut exercise.sets);
        }

        let mut supersets = repr.supersets;
        let dropped = supersets.retain_members(|id| exercise_ids.contains(&id));
        if !dropped.is_empty() {
            tracing::warn!(session_id = %repr.id, dropped = dropped.len(), "unknown superset members dropped");
        }

        Ok(Self {
            id: repr.id,
            name: repr.name,
            routine_id: repr.routine_id,
            started_at: repr.started_at,
            clock: repr.clock,
            exercises,
            supersets,
        })
    }
}

//! Exercise and set operations on a session

use crate::error::SessionError;
use crate::ids::{ExerciseId, SetId, SupersetId};
use crate::model::{renumber, Exercise, ExercisePatch, ExerciseSpec, Set, SetPatch, WorkoutSession};
use crate::state_machine::{validate_transition, SetState};
use std::collections::HashSet;

impl WorkoutSession {
    /// Append an exercise with `spec.initial_sets` empty sets
    pub fn add_exercise(&mut self, spec: ExerciseSpec) -> ExerciseId {
        let id = ExerciseId::new();
        let sets = (0..spec.initial_sets).map(Set::new).collect();
        tracing::debug!(%id, name = %spec.name, "exercise added");
        self.exercises.push(Exercise {
            id,
            catalog_id: spec.catalog_id,
            name: spec.name,
            sets,
            notes: spec.notes,
        });
        id
    }

    /// Remove an exercise, detaching it from its superset first
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`
    pub fn remove_exercise(&mut self, id: ExerciseId) -> Result<Exercise, SessionError> {
        let pos = self.position(id)?;
        if self.supersets.group_of(id).is_some() {
            self.supersets.remove(id)?;
        }
        Ok(self.exercises.remove(pos))
    }

    /// Rename or edit notes
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`
    pub fn update_exercise(&mut self, id: ExerciseId, patch: ExercisePatch) -> Result<(), SessionError> {
        let exercise = self.exercise_mut(id)?;
        if let Some(name) = patch.name {
            exercise.name = name;
        }
        if let Some(notes) = patch.notes {
            exercise.notes = notes;
        }
        Ok(())
    }

    /// Append a set, pre-filled with the previous set's weight and reps
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`
    pub fn add_set(&mut self, exercise_id: ExerciseId) -> Result<SetId, SessionError> {
        let exercise = self.exercise_mut(exercise_id)?;
        let order = exercise.sets.last().map_or(0, |s| s.order.saturating_add(1));
        let mut set = Set::new(order);
        if let Some(previous) = exercise.sets.last() {
            set.weight = previous.weight;
            set.reps = previous.reps;
        }
        let id = set.id;
        exercise.sets.push(set);
        Ok(id)
    }

    /// Apply field edits without the completion gate
    ///
    /// This is the edit-sheet auto-save path: values may be saved while
    /// still incomplete, even on a set that is already marked done.
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`, `SessionError::SetNotFound`
    pub fn update_set(
        &mut self,
        exercise_id: ExerciseId,
        set_id: SetId,
        patch: SetPatch,
    ) -> Result<(), SessionError> {
        let set = self.set_mut(exercise_id, set_id)?;
        patch.apply(set);
        Ok(())
    }

    /// Delete a set and renumber the rest
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`, `SessionError::SetNotFound`
    pub fn remove_set(&mut self, exercise_id: ExerciseId, set_id: SetId) -> Result<Set, SessionError> {
        let exercise = self.exercise_mut(exercise_id)?;
        let pos = exercise
            .sets
            .iter()
            .position(|s| s.id == set_id)
            .ok_or(SessionError::SetNotFound { exercise_id, set_id })?;
        validate_transition(SetState::from_completed(exercise.sets[pos].completed), SetState::Deleted)?;

        let removed = exercise.sets.remove(pos);
        renumber(&mut exercise.sets);
        Ok(removed)
    }

    /// Flip a set between incomplete and completed
    ///
    /// Completing requires non-zero weight and reps; on failure the set is
    /// left untouched. Returns the new completed flag.
    ///
    /// # Errors
    /// `SessionError::IncompleteSet` plus the lookup errors
    pub fn toggle_set_completion(
        &mut self,
        exercise_id: ExerciseId,
        set_id: SetId,
    ) -> Result<bool, SessionError> {
        let set = self.set_mut(exercise_id, set_id)?;
        let from = SetState::from_completed(set.completed);
        let to = SetState::from_completed(!set.completed);
        validate_transition(from, to)?;

        if to == SetState::Completed {
            let missing = set.missing_fields();
            if !missing.is_empty() {
                return Err(SessionError::IncompleteSet {
                    exercise_id,
                    set_id,
                    missing,
                });
            }
        }

        set.completed = !set.completed;
        Ok(set.completed)
    }

    /// Replace the exercise order with `order`
    ///
    /// # Errors
    /// `SessionError::NotAPermutation` unless `order` holds every current
    /// exercise id exactly once; the session is unchanged in that case
    pub fn reorder_exercises(&mut self, order: &[ExerciseId]) -> Result<(), SessionError> {
        let reject = || SessionError::NotAPermutation {
            expected: self.exercises.len(),
            actual: order.len(),
        };
        if order.len() != self.exercises.len() {
            return Err(reject());
        }
        let wanted: HashSet<ExerciseId> = order.iter().copied().collect();
        if wanted.len() != order.len() || self.exercises.iter().any(|e| !wanted.contains(&e.id)) {
            return Err(reject());
        }

        let mut remaining = std::mem::take(&mut self.exercises);
        for id in order {
            if let Some(pos) = remaining.iter().position(|e| e.id == *id) {
                self.exercises.push(remaining.swap_remove(pos));
            }
        }
        Ok(())
    }

    /// Group `exercise_ids` with `anchor` (see [`crate::SupersetGroups::create_or_join`])
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound` for unknown ids, plus grouping errors
    pub fn create_or_join_superset(
        &mut self,
        exercise_ids: &[ExerciseId],
        anchor: ExerciseId,
    ) -> Result<SupersetId, SessionError> {
        for id in exercise_ids.iter().chain(std::iter::once(&anchor)) {
            self.position(*id)?;
        }
        self.supersets.create_or_join(exercise_ids, anchor)
    }

    /// Take an exercise out of its superset
    ///
    /// # Errors
    /// `SessionError::ExerciseNotFound`, `SessionError::NotInSuperset`
    pub fn remove_from_superset(&mut self, exercise_id: ExerciseId) -> Result<Vec<ExerciseId>, SessionError> {
        self.position(exercise_id)?;
        self.supersets.remove(exercise_id)
    }

    fn position(&self, id: ExerciseId) -> Result<usize, SessionError> {
        self.exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or(SessionError::ExerciseNotFound(id))
    }

    fn exercise_mut(&mut self, id: ExerciseId) -> Result<&mut Exercise, SessionError> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SessionError::ExerciseNotFound(id))
    }

    fn set_mut(&mut self, exercise_id: ExerciseId, set_id: SetId) -> Result<&mut Set, SessionError> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or(SessionError::SetNotFound { exercise_id, set_id })
    }
}

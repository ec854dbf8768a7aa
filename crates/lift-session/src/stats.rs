//! Derived statistics
//!
//! Always recomputed from the sets; nothing here is stored on the session.
//! Only completed sets count.

use crate::ids::ExerciseId;
use crate::model::{Exercise, WorkoutSession};
use serde::{Deserialize, Serialize};

/// Brzycki estimate of the one-rep max: weight × 36 / (37 - reps)
///
/// Never exceeds double the weight, which the formula reaches at 19 reps.
#[must_use]
pub fn estimated_1rm(weight: f64, reps: u32) -> f64 {
    let cap = weight * 2.0;
    match reps {
        0 => 0.0,
        1 => weight,
        r if r >= BRZYCKI_CEILING => cap,
        r => (weight * (36.0 / (37.0 - f64::from(r)))).min(cap),
    }
}

/// Rep count from which the estimate is flat at its cap
const BRZYCKI_CEILING: u32 = 19;

/// Totals for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStats {
    /// Exercise instance
    pub exercise_id: ExerciseId,
    /// Display name
    pub name: String,
    /// Completed sets
    pub completed_sets: usize,
    /// Σ weight × reps over completed sets
    pub volume: f64,
    /// Best e1RM over completed sets
    pub best_estimated_1rm: Option<f64>,
}

impl ExerciseStats {
    /// Compute from an exercise's sets
    #[must_use]
    pub fn compute(exercise: &Exercise) -> Self {
        let mut completed_sets = 0;
        let mut volume = 0.0;
        let mut best: Option<f64> = None;

        for set in exercise.completed_sets() {
            completed_sets += 1;
            volume += set.volume();
            if let (Some(weight), Some(reps)) = (set.weight, set.reps) {
                let e1rm = estimated_1rm(weight, reps);
                best = Some(best.map_or(e1rm, |b| b.max(e1rm)));
            }
        }

        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            completed_sets,
            volume,
            best_estimated_1rm: best,
        }
    }
}

/// Totals for a whole session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Completed sets across all exercises
    pub completed_sets: usize,
    /// All sets, completed or not
    pub total_sets: usize,
    /// Exercises in the session
    pub exercise_count: usize,
    /// Σ weight × reps over completed sets
    pub total_volume: f64,
}

impl SessionStats {
    /// Compute from the session's sets
    #[must_use]
    pub fn compute(session: &WorkoutSession) -> Self {
        session
            .exercises()
            .iter()
            .fold(Self::default(), |mut acc, exercise| {
                acc.exercise_count += 1;
                acc.total_sets += exercise.sets.len();
                for set in exercise.completed_sets() {
                    acc.completed_sets += 1;
                    acc.total_volume += set.volume();
                }
                acc
            })
    }

    /// Per-exercise breakdown, in display order
    #[must_use]
    pub fn per_exercise(session: &WorkoutSession) -> Vec<ExerciseStats> {
        session.exercises().iter().map(ExerciseStats::compute).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brzycki_edges() {
        assert_eq!(estimated_1rm(100.0, 0), 0.0);
        assert_eq!(estimated_1rm(100.0, 1), 100.0);
        assert_eq!(estimated_1rm(100.0, 40), 200.0);
        assert!((estimated_1rm(100.0, 10) - 133.333).abs() < 0.001);
    }

    #[test]
    fn brzycki_never_decreases_with_reps() {
        let mut previous = 0.0;
        for reps in 1..=40 {
            let e1rm = estimated_1rm(100.0, reps);
            assert!(e1rm >= previous, "{reps} reps gave {e1rm} after {previous}");
            assert!(e1rm <= 200.0, "{reps} reps gave {e1rm}");
            previous = e1rm;
        }
        assert_eq!(estimated_1rm(100.0, 36), 200.0);
        assert!((estimated_1rm(100.0, 18) - 189.474).abs() < 0.001);
    }

    #[test]
    fn empty_session_has_zero_stats() {
        let session = WorkoutSession::new("Empty");
        assert_eq!(SessionStats::compute(&session), SessionStats::default());
    }
}

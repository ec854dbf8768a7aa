//! Scripted workout simulator
//!
//! Replays a JSON script of user actions and timer ticks against a
//! [`SessionStore`] and reports the resulting workout. Exercises and sets
//! are addressed by their position at the time the step runs, so scripts
//! never need to know generated ids.
//!
//! ```json
//! {
//!   "name": "Push",
//!   "steps": [
//!     {"action": "add_exercise", "name": "Bench Press", "sets": 2},
//!     {"action": "start", "timer": "duration"},
//!     {"action": "update_set", "exercise": 0, "set": 0, "weight": 100, "reps": 10},
//!     {"action": "toggle_set", "exercise": 0, "set": 0},
//!     {"action": "tick", "timer": "rest", "count": 120}
//!   ]
//! }
//! ```

use crate::config::WorkoutConfig;
use crate::error::{BoundaryError, CoreError};
use crate::store::{Action, SessionStore, StoreEvent};
use lift_session::{
    ExerciseId, ExercisePatch, ExerciseSpec, ExerciseStats, Rpe, SessionStats, SetId, SetPatch, SupersetGroups,
    WorkoutSession,
};
use lift_timer::TimerKind;
use serde::{Deserialize, Serialize};

/// A scripted workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Workout name
    #[serde(default = "Script::default_name")]
    pub name: String,
    /// Steps, in order
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script
    ///
    /// # Errors
    /// `BoundaryError::Malformed` when the JSON does not describe a script
    pub fn from_json_str(input: &str) -> Result<Self, BoundaryError> {
        serde_json::from_str(input).map_err(|e| BoundaryError::Malformed {
            entity: "script",
            reason: e.to_string(),
        })
    }

    fn default_name() -> String {
        "Workout".to_string()
    }
}

/// One scripted user action or timer event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Append an exercise
    AddExercise {
        /// Display name
        name: String,
        /// Empty sets to create
        #[serde(default = "one")]
        sets: u32,
        /// Notes
        #[serde(default)]
        notes: Option<String>,
    },
    /// Remove the exercise at a position
    RemoveExercise {
        /// Exercise position
        exercise: usize,
    },
    /// Rename the exercise at a position
    RenameExercise {
        /// Exercise position
        exercise: usize,
        /// New name
        name: String,
    },
    /// Append a set
    AddSet {
        /// Exercise position
        exercise: usize,
    },
    /// Edit set fields; absent fields are left unchanged
    UpdateSet {
        /// Exercise position
        exercise: usize,
        /// Set position
        set: usize,
        /// Load
        #[serde(default)]
        weight: Option<f64>,
        /// Repetitions
        #[serde(default)]
        reps: Option<u32>,
        /// Perceived exertion
        #[serde(default)]
        rpe: Option<u8>,
    },
    /// Delete a set
    RemoveSet {
        /// Exercise position
        exercise: usize,
        /// Set position
        set: usize,
    },
    /// Mark a set done or not done
    ToggleSet {
        /// Exercise position
        exercise: usize,
        /// Set position
        set: usize,
    },
    /// Reorder exercises by current positions
    Reorder {
        /// New order as current positions
        order: Vec<usize>,
    },
    /// Group exercises with an anchor
    Superset {
        /// Exercise positions to group
        exercises: Vec<usize>,
        /// Anchor position
        anchor: usize,
    },
    /// Ungroup an exercise
    Ungroup {
        /// Exercise position
        exercise: usize,
    },
    /// Start a timer
    Start {
        /// Timer
        timer: TimerKind,
    },
    /// Pause a timer
    Pause {
        /// Timer
        timer: TimerKind,
    },
    /// Reset a timer
    Reset {
        /// Timer
        timer: TimerKind,
        /// New value in seconds
        to_secs: u32,
    },
    /// Deliver ticks to a timer
    Tick {
        /// Timer
        timer: TimerKind,
        /// Number of ticks
        #[serde(default = "one")]
        count: u32,
    },
    /// Silence the rest alarm
    AcknowledgeRest,
}

/// Most ticks a single `tick` step may deliver, one day of seconds
pub const MAX_TICKS_PER_STEP: u32 = 86_400;

fn one() -> u32 {
    1
}

/// A step the store refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Zero-based step number
    pub step: usize,
    /// Why it was refused
    pub reason: String,
    /// Whether it was a validation failure
    pub validation: bool,
}

/// A superset as shown in the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupersetSummary {
    /// Group number
    pub group: u32,
    /// Display color
    pub color: String,
    /// Member exercise names, in workout order
    pub members: Vec<String>,
}

/// End state of a simulated workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Workout name
    pub name: String,
    /// Active workout seconds
    pub duration_secs: u64,
    /// Stopwatch seconds
    pub stopwatch_secs: u64,
    /// Rest countdown seconds left
    pub rest_remaining_secs: u32,
    /// Session totals
    pub stats: SessionStats,
    /// Per-exercise totals
    pub exercises: Vec<ExerciseStats>,
    /// Superset groups
    pub supersets: Vec<SupersetSummary>,
}

impl WorkoutSummary {
    /// Summarize the current store state
    #[must_use]
    pub fn from_store(store: &SessionStore) -> Self {
        let session = store.session();
        let supersets = session
            .supersets()
            .iter()
            .map(|(group, _)| SupersetSummary {
                group: group.0,
                color: SupersetGroups::color_for(group).to_string(),
                members: session
                    .exercises()
                    .iter()
                    .filter(|e| session.supersets().group_of(e.id) == Some(group))
                    .map(|e| e.name.clone())
                    .collect(),
            })
            .collect();

        Self {
            name: session.name.clone(),
            duration_secs: session.duration_secs(),
            stopwatch_secs: store.stopwatch().elapsed_secs(),
            rest_remaining_secs: store.rest().remaining_secs(),
            stats: store.stats().clone(),
            exercises: SessionStats::per_exercise(session),
            supersets,
        }
    }
}

/// Result of running a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorReport {
    /// Final workout state
    pub summary: WorkoutSummary,
    /// Steps the store refused
    pub rejected: Vec<Rejection>,
    /// Rest alarms that fired
    pub rest_alarms: usize,
    /// Steps executed
    pub steps: usize,
}

impl SimulatorReport {
    /// Human-readable report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        out.push_str(&format!("Workout: {}\n", s.name));
        out.push_str(&format!("  Duration: {}s\n", s.duration_secs));
        out.push_str(&format!(
            "  Sets: {}/{} completed across {} exercises\n",
            s.stats.completed_sets, s.stats.total_sets, s.stats.exercise_count
        ));
        out.push_str(&format!("  Volume: {:.1}\n", s.stats.total_volume));
        for ex in &s.exercises {
            let e1rm = ex
                .best_estimated_1rm
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
            out.push_str(&format!(
                "    {}: {} sets, volume {:.1}, e1RM {}\n",
                ex.name, ex.completed_sets, ex.volume, e1rm
            ));
        }
        for group in &s.supersets {
            out.push_str(&format!(
                "  Superset {} ({}): {}\n",
                group.group,
                group.color,
                group.members.join(", ")
            ));
        }
        out.push_str(&format!("  Rest alarms: {}\n", self.rest_alarms));
        out.push_str(&format!("  Steps: {} ({} rejected)\n", self.steps, self.rejected.len()));
        for r in &self.rejected {
            out.push_str(&format!("    step {}: {}\n", r.step, r.reason));
        }
        out
    }
}

/// Replay `script` against a fresh session
///
/// Refused steps are recorded and the replay continues.
///
/// # Errors
/// `CoreError` when `config` is invalid
pub fn run_simulator(script: &Script, config: &WorkoutConfig) -> Result<SimulatorReport, CoreError> {
    config.validate()?;
    let mut store = SessionStore::new(WorkoutSession::new(script.name.clone()), config)?;
    let mut rejected = Vec::new();
    let mut rest_alarms = 0;

    for (step, entry) in script.steps.iter().enumerate() {
        let (action, repeat) = match resolve(store.session(), entry) {
            Ok(resolved) => resolved,
            Err(e) => {
                rejected.push(Rejection {
                    step,
                    reason: e.to_string(),
                    validation: false,
                });
                continue;
            }
        };
        for _ in 0..repeat {
            if let Err(e) = store.dispatch(action.clone()) {
                rejected.push(Rejection {
                    step,
                    reason: e.to_string(),
                    validation: e.alert().is_none(),
                });
                break;
            }
        }
        rest_alarms += store
            .drain_events()
            .iter()
            .filter(|e| matches!(e, StoreEvent::RestExpired))
            .count();
    }

    tracing::info!(
        steps = script.steps.len(),
        rejected = rejected.len(),
        "simulation complete"
    );
    Ok(SimulatorReport {
        summary: WorkoutSummary::from_store(&store),
        rejected,
        rest_alarms,
        steps: script.steps.len(),
    })
}

/// Resolve a step to an action and the number of times to apply it
fn resolve(session: &WorkoutSession, step: &ScriptStep) -> Result<(Action, u32), CoreError> {
    let action = match step {
        ScriptStep::AddExercise { name, sets, notes } => {
            let mut spec = ExerciseSpec::new(name.clone()).with_sets(*sets);
            if let Some(notes) = notes {
                spec = spec.with_notes(notes.clone());
            }
            Action::AddExercise(spec)
        }
        ScriptStep::RemoveExercise { exercise } => Action::RemoveExercise(exercise_at(session, *exercise)?),
        ScriptStep::RenameExercise { exercise, name } => Action::UpdateExercise {
            exercise_id: exercise_at(session, *exercise)?,
            patch: ExercisePatch::rename(name.clone()),
        },
        ScriptStep::AddSet { exercise } => Action::AddSet(exercise_at(session, *exercise)?),
        ScriptStep::UpdateSet {
            exercise,
            set,
            weight,
            reps,
            rpe,
        } => {
            let (exercise_id, set_id) = set_at(session, *exercise, *set)?;
            let mut patch = SetPatch::new();
            if let Some(weight) = weight {
                patch = patch.weight(*weight);
            }
            if let Some(reps) = reps {
                patch = patch.reps(*reps);
            }
            if let Some(rpe) = rpe {
                patch = patch.rpe(Rpe::new(*rpe)?);
            }
            Action::UpdateSet {
                exercise_id,
                set_id,
                patch,
            }
        }
        ScriptStep::RemoveSet { exercise, set } => {
            let (exercise_id, set_id) = set_at(session, *exercise, *set)?;
            Action::RemoveSet { exercise_id, set_id }
        }
        ScriptStep::ToggleSet { exercise, set } => {
            let (exercise_id, set_id) = set_at(session, *exercise, *set)?;
            Action::ToggleSet { exercise_id, set_id }
        }
        ScriptStep::Reorder { order } => Action::ReorderExercises(
            order
                .iter()
                .map(|&i| exercise_at(session, i))
                .collect::<Result<_, _>>()?,
        ),
        ScriptStep::Superset { exercises, anchor } => Action::CreateOrJoinSuperset {
            exercise_ids: exercises
                .iter()
                .map(|&i| exercise_at(session, i))
                .collect::<Result<_, _>>()?,
            anchor: exercise_at(session, *anchor)?,
        },
        ScriptStep::Ungroup { exercise } => Action::RemoveFromSuperset(exercise_at(session, *exercise)?),
        ScriptStep::Start { timer } => Action::StartTimer(*timer),
        ScriptStep::Pause { timer } => Action::PauseTimer(*timer),
        ScriptStep::Reset { timer, to_secs } => Action::ResetTimer {
            kind: *timer,
            to_secs: *to_secs,
        },
        ScriptStep::Tick { timer, count } => {
            if *count > MAX_TICKS_PER_STEP {
                return Err(bad_step(format!(
                    "tick count {count} exceeds {MAX_TICKS_PER_STEP}"
                )));
            }
            return Ok((Action::Tick(*timer), *count));
        }
        ScriptStep::AcknowledgeRest => Action::AcknowledgeRest,
    };
    Ok((action, 1))
}

fn exercise_at(session: &WorkoutSession, index: usize) -> Result<ExerciseId, CoreError> {
    session
        .exercises()
        .get(index)
        .map(|e| e.id)
        .ok_or_else(|| bad_step(format!("no exercise at position {index}")))
}

fn set_at(session: &WorkoutSession, exercise: usize, set: usize) -> Result<(ExerciseId, SetId), CoreError> {
    let exercise_id = exercise_at(session, exercise)?;
    session
        .exercise(exercise_id)
        .and_then(|e| e.sets.get(set))
        .map(|s| (exercise_id, s.id))
        .ok_or_else(|| bad_step(format!("no set at position {set} of exercise {exercise}")))
}

fn bad_step(reason: String) -> CoreError {
    BoundaryError::Malformed {
        entity: "script step",
        reason,
    }
    .into()
}

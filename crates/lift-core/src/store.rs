//! Session store
//!
//! Explicit state container for an in-progress workout. Every change goes
//! through [`SessionStore::dispatch`], which applies one [`Action`],
//! recomputes the derived stats and queues [`StoreEvent`]s for the
//! controller to react to (feedback, ticker lifecycle).
//!
//! ```text
//! Action --dispatch--> WorkoutSession / timers --> SessionStats
//!                                           \--> StoreEvent queue
//! ```

use crate::config::WorkoutConfig;
use crate::error::CoreError;
use lift_session::{
    ExerciseId, ExercisePatch, ExerciseSpec, MissingFields, SessionError, SessionStats, SetId, SetPatch,
    WorkoutSession,
};
use lift_timer::{RestTick, RestTimer, Stopwatch, TimerKind};
use serde::{Deserialize, Serialize};

/// A single mutation of the store
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append an exercise
    AddExercise(ExerciseSpec),
    /// Remove an exercise (and its superset membership)
    RemoveExercise(ExerciseId),
    /// Rename or edit notes
    UpdateExercise {
        /// Target exercise
        exercise_id: ExerciseId,
        /// Edits
        patch: ExercisePatch,
    },
    /// Append a pre-filled set
    AddSet(ExerciseId),
    /// Edit set fields without the completion gate
    UpdateSet {
        /// Owning exercise
        exercise_id: ExerciseId,
        /// Target set
        set_id: SetId,
        /// Edits
        patch: SetPatch,
    },
    /// Delete a set
    RemoveSet {
        /// Owning exercise
        exercise_id: ExerciseId,
        /// Target set
        set_id: SetId,
    },
    /// Mark a set done or not done
    ToggleSet {
        /// Owning exercise
        exercise_id: ExerciseId,
        /// Target set
        set_id: SetId,
    },
    /// Replace the exercise order
    ReorderExercises(Vec<ExerciseId>),
    /// Group exercises with an anchor
    CreateOrJoinSuperset {
        /// Exercises to group
        exercise_ids: Vec<ExerciseId>,
        /// Exercise whose group is joined, or which seeds a new one
        anchor: ExerciseId,
    },
    /// Ungroup an exercise
    RemoveFromSuperset(ExerciseId),
    /// Start or resume a timer
    StartTimer(TimerKind),
    /// Pause a timer
    PauseTimer(TimerKind),
    /// Overwrite a timer's value and stop it
    ResetTimer {
        /// Timer to reset
        kind: TimerKind,
        /// New value in seconds
        to_secs: u32,
    },
    /// Change the rest length restored after each alarm
    SetRestDefault(u32),
    /// One period elapsed for a timer
    Tick(TimerKind),
    /// Silence the rest alarm
    AcknowledgeRest,
    /// Hide the validation flash early
    DismissFlash,
}

impl Action {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddExercise(_) => "add_exercise",
            Self::RemoveExercise(_) => "remove_exercise",
            Self::UpdateExercise { .. } => "update_exercise",
            Self::AddSet(_) => "add_set",
            Self::UpdateSet { .. } => "update_set",
            Self::RemoveSet { .. } => "remove_set",
            Self::ToggleSet { .. } => "toggle_set",
            Self::ReorderExercises(_) => "reorder_exercises",
            Self::CreateOrJoinSuperset { .. } => "create_or_join_superset",
            Self::RemoveFromSuperset(_) => "remove_from_superset",
            Self::StartTimer(_) => "start_timer",
            Self::PauseTimer(_) => "pause_timer",
            Self::ResetTimer { .. } => "reset_timer",
            Self::SetRestDefault(_) => "set_rest_default",
            Self::Tick(_) => "tick",
            Self::AcknowledgeRest => "acknowledge_rest",
            Self::DismissFlash => "dismiss_flash",
        }
    }

    /// Whether the action edits exercises or sets
    #[must_use]
    pub fn edits_session(&self) -> bool {
        !matches!(
            self,
            Self::StartTimer(_)
                | Self::PauseTimer(_)
                | Self::ResetTimer { .. }
                | Self::SetRestDefault(_)
                | Self::Tick(_)
                | Self::AcknowledgeRest
                | Self::DismissFlash
        )
    }
}

/// Fields to highlight after a rejected completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlash {
    /// Owning exercise
    pub exercise_id: ExerciseId,
    /// Rejected set
    pub set_id: SetId,
    /// Fields to highlight
    pub missing: MissingFields,
    /// Duration ticks until the flash disappears
    pub remaining_ticks: u32,
}

/// Something the controller may need to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A set was marked done
    SetCompleted {
        /// Owning exercise
        exercise_id: ExerciseId,
        /// Completed set
        set_id: SetId,
    },
    /// Rest countdown started
    RestStarted {
        /// Countdown length
        secs: u32,
    },
    /// Rest countdown reached zero
    RestExpired,
    /// Rest alarm over, default restored
    RestReset {
        /// Next countdown length
        remaining_secs: u32,
    },
    /// Completion rejected, fields flashing
    FlashRaised(ValidationFlash),
    /// Flash expired or was dismissed
    FlashCleared,
}

/// In-progress workout state with a single mutation path
#[derive(Debug, Clone)]
pub struct SessionStore {
    session: WorkoutSession,
    rest: RestTimer,
    stopwatch: Stopwatch,
    stats: SessionStats,
    flash: Option<ValidationFlash>,
    events: Vec<StoreEvent>,
    auto_rest: bool,
    flash_ticks: u32,
}

impl SessionStore {
    /// Wrap a session with timers built from `config`
    ///
    /// # Errors
    /// `CoreError::Timer` when the rest default is zero
    pub fn new(session: WorkoutSession, config: &WorkoutConfig) -> Result<Self, CoreError> {
        let stats = SessionStats::compute(&session);
        Ok(Self {
            session,
            rest: RestTimer::new(config.rest_default_secs)?,
            stopwatch: Stopwatch::new(),
            stats,
            flash: None,
            events: Vec::new(),
            auto_rest: config.auto_rest,
            flash_ticks: config.flash_secs,
        })
    }

    /// Apply one action
    ///
    /// A failed action leaves the session unchanged. A rejected completion
    /// additionally raises a [`ValidationFlash`].
    ///
    /// # Errors
    /// The session or timer error that rejected the action
    pub fn dispatch(&mut self, action: Action) -> Result<(), CoreError> {
        let name = action.name();
        let edits_session = action.edits_session();
        tracing::debug!(action = name, "dispatch");

        match self.apply(action) {
            Ok(()) => {
                if edits_session {
                    self.clear_flash();
                    self.stats = SessionStats::compute(&self.session);
                }
                Ok(())
            }
            Err(CoreError::Session(SessionError::IncompleteSet {
                exercise_id,
                set_id,
                missing,
            })) => {
                tracing::warn!(%set_id, %missing, "set completion rejected");
                let flash = ValidationFlash {
                    exercise_id,
                    set_id,
                    missing,
                    remaining_ticks: self.flash_ticks,
                };
                self.flash = Some(flash);
                self.events.push(StoreEvent::FlashRaised(flash));
                Err(SessionError::IncompleteSet {
                    exercise_id,
                    set_id,
                    missing,
                }
                .into())
            }
            Err(e) => {
                tracing::warn!(action = name, error = %e, "action rejected");
                Err(e)
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<(), CoreError> {
        match action {
            Action::AddExercise(spec) => {
                self.session.add_exercise(spec);
            }
            Action::RemoveExercise(id) => {
                self.session.remove_exercise(id)?;
            }
            Action::UpdateExercise { exercise_id, patch } => {
                self.session.update_exercise(exercise_id, patch)?;
            }
            Action::AddSet(exercise_id) => {
                self.session.add_set(exercise_id)?;
            }
            Action::UpdateSet {
                exercise_id,
                set_id,
                patch,
            } => self.session.update_set(exercise_id, set_id, patch)?,
            Action::RemoveSet { exercise_id, set_id } => {
                self.session.remove_set(exercise_id, set_id)?;
            }
            Action::ToggleSet { exercise_id, set_id } => {
                if self.session.toggle_set_completion(exercise_id, set_id)? {
                    self.events.push(StoreEvent::SetCompleted { exercise_id, set_id });
                    if self.auto_rest {
                        self.rest.reset(self.rest.default_secs())?;
                        self.start_rest();
                    }
                }
            }
            Action::ReorderExercises(order) => self.session.reorder_exercises(&order)?,
            Action::CreateOrJoinSuperset { exercise_ids, anchor } => {
                self.session.create_or_join_superset(&exercise_ids, anchor)?;
            }
            Action::RemoveFromSuperset(id) => {
                self.session.remove_from_superset(id)?;
            }
            Action::StartTimer(kind) => match kind {
                TimerKind::Duration => self.session.clock.start(),
                TimerKind::Rest => self.start_rest(),
                TimerKind::Stopwatch => self.stopwatch.start(),
            },
            Action::PauseTimer(kind) => match kind {
                TimerKind::Duration => self.session.clock.pause(),
                TimerKind::Rest => self.rest.pause(),
                TimerKind::Stopwatch => self.stopwatch.pause(),
            },
            Action::ResetTimer { kind, to_secs } => match kind {
                TimerKind::Duration => self.session.clock.reset(u64::from(to_secs)),
                TimerKind::Rest => self.rest.reset(to_secs)?,
                TimerKind::Stopwatch => self.stopwatch.reset(u64::from(to_secs)),
            },
            Action::SetRestDefault(secs) => self.rest.set_default(secs)?,
            Action::Tick(kind) => self.tick(kind),
            Action::AcknowledgeRest => {
                self.rest.acknowledge();
                self.events.push(StoreEvent::RestReset {
                    remaining_secs: self.rest.remaining_secs(),
                });
            }
            Action::DismissFlash => self.clear_flash(),
        }
        Ok(())
    }

    fn start_rest(&mut self) {
        self.rest.start();
        self.events.push(StoreEvent::RestStarted {
            secs: self.rest.remaining_secs(),
        });
    }

    fn tick(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Duration => {
                self.session.clock.tick();
                self.age_flash();
            }
            TimerKind::Stopwatch => {
                self.stopwatch.tick();
            }
            TimerKind::Rest => match self.rest.tick() {
                RestTick::Expired => self.events.push(StoreEvent::RestExpired),
                RestTick::Reset { remaining_secs } => {
                    self.events.push(StoreEvent::RestReset { remaining_secs });
                }
                RestTick::Idle | RestTick::Counting { .. } => {}
            },
        }
    }

    fn age_flash(&mut self) {
        if let Some(flash) = self.flash.as_mut() {
            flash.remaining_ticks = flash.remaining_ticks.saturating_sub(1);
            if flash.remaining_ticks == 0 {
                self.clear_flash();
            }
        }
    }

    fn clear_flash(&mut self) {
        if self.flash.take().is_some() {
            self.events.push(StoreEvent::FlashCleared);
        }
    }

    /// Take the queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether ticks of `kind` still change the store
    ///
    /// The duration ticker also stays alive while a flash is visible, since
    /// flashes age on duration ticks.
    #[must_use]
    pub fn timer_active(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Duration => self.session.clock.is_running() || self.flash.is_some(),
            TimerKind::Rest => self.rest.needs_ticks(),
            TimerKind::Stopwatch => self.stopwatch.is_running(),
        }
    }

    /// The session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &WorkoutSession {
        &self.session
    }

    /// Stats as of the last edit
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Rest countdown
    #[inline]
    #[must_use]
    pub fn rest(&self) -> &RestTimer {
        &self.rest
    }

    /// Stopwatch
    #[inline]
    #[must_use]
    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Visible validation flash
    #[inline]
    #[must_use]
    pub fn flash(&self) -> Option<&ValidationFlash> {
        self.flash.as_ref()
    }

    /// Give up the session, dropping timers and pending events
    #[must_use]
    pub fn into_session(self) -> WorkoutSession {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_timer::RestPhase;

    fn store() -> SessionStore {
        SessionStore::new(WorkoutSession::new("Test"), &WorkoutConfig::default()).unwrap()
    }

    fn first_set(store: &SessionStore, exercise_id: ExerciseId) -> SetId {
        store.session().exercise(exercise_id).unwrap().sets[0].id
    }

    #[test]
    fn rejected_toggle_raises_flash_that_ages_out() {
        let mut store = store();
        store.dispatch(Action::AddExercise(ExerciseSpec::new("Squat"))).unwrap();
        let ex = store.session().exercise_ids()[0];
        let set = first_set(&store, ex);

        let err = store
            .dispatch(Action::ToggleSet {
                exercise_id: ex,
                set_id: set,
            })
            .unwrap_err();
        assert!(err.alert().is_none());
        assert_eq!(store.flash().unwrap().remaining_ticks, 2);
        assert!(store.timer_active(TimerKind::Duration));

        store.dispatch(Action::Tick(TimerKind::Duration)).unwrap();
        store.dispatch(Action::Tick(TimerKind::Duration)).unwrap();

        assert!(store.flash().is_none());
        assert!(!store.timer_active(TimerKind::Duration));
        assert_eq!(store.session().duration_secs(), 0);
        let events = store.drain_events();
        assert!(matches!(events[0], StoreEvent::FlashRaised(_)));
        assert_eq!(events[1], StoreEvent::FlashCleared);
    }

    #[test]
    fn completing_a_set_starts_rest() {
        let mut store = store();
        store.dispatch(Action::AddExercise(ExerciseSpec::new("Bench"))).unwrap();
        let ex = store.session().exercise_ids()[0];
        let set = first_set(&store, ex);
        store
            .dispatch(Action::UpdateSet {
                exercise_id: ex,
                set_id: set,
                patch: SetPatch::new().weight(60.0).reps(5),
            })
            .unwrap();
        store
            .dispatch(Action::ToggleSet {
                exercise_id: ex,
                set_id: set,
            })
            .unwrap();

        assert_eq!(store.stats().total_volume, 300.0);
        assert_eq!(store.rest().phase(), RestPhase::Running);
        assert_eq!(
            store.drain_events(),
            vec![
                StoreEvent::SetCompleted {
                    exercise_id: ex,
                    set_id: set
                },
                StoreEvent::RestStarted { secs: 120 },
            ]
        );
    }

    #[test]
    fn auto_rest_can_be_disabled() {
        let config = WorkoutConfig::default().with_auto_rest(false);
        let mut session = WorkoutSession::new("Test");
        let ex = session.add_exercise(ExerciseSpec::new("Row"));
        let set = session.exercise(ex).unwrap().sets[0].id;
        session
            .update_set(ex, set, SetPatch::new().weight(50.0).reps(8))
            .unwrap();
        let mut store = SessionStore::new(session, &config).unwrap();

        store
            .dispatch(Action::ToggleSet {
                exercise_id: ex,
                set_id: set,
            })
            .unwrap();

        assert_eq!(store.rest().phase(), RestPhase::Idle);
        assert!(!store.timer_active(TimerKind::Rest));
    }

    #[test]
    fn rest_expiry_and_reset_are_reported() {
        let mut store = store();
        store
            .dispatch(Action::ResetTimer {
                kind: TimerKind::Rest,
                to_secs: 2,
            })
            .unwrap();
        store.dispatch(Action::StartTimer(TimerKind::Rest)).unwrap();
        for _ in 0..3 {
            store.dispatch(Action::Tick(TimerKind::Rest)).unwrap();
        }

        assert_eq!(
            store.drain_events(),
            vec![
                StoreEvent::RestStarted { secs: 2 },
                StoreEvent::RestExpired,
                StoreEvent::RestReset { remaining_secs: 120 },
            ]
        );
        assert_eq!(store.rest().phase(), RestPhase::Idle);
    }

    #[test]
    fn timers_are_independent() {
        let mut store = store();
        store.dispatch(Action::StartTimer(TimerKind::Duration)).unwrap();
        store.dispatch(Action::StartTimer(TimerKind::Stopwatch)).unwrap();
        store.dispatch(Action::PauseTimer(TimerKind::Stopwatch)).unwrap();

        store.dispatch(Action::Tick(TimerKind::Duration)).unwrap();
        store.dispatch(Action::Tick(TimerKind::Stopwatch)).unwrap();

        assert_eq!(store.session().duration_secs(), 1);
        assert_eq!(store.stopwatch().elapsed_secs(), 0);
        assert!(!store.timer_active(TimerKind::Stopwatch));
    }

    #[test]
    fn failed_edit_keeps_session_and_stats() {
        let mut store = store();
        let before = store.session().clone();
        let err = store
            .dispatch(Action::ReorderExercises(vec![ExerciseId::new()]))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Session(SessionError::NotAPermutation { .. })
        ));
        assert_eq!(store.session(), &before);
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn zero_rest_reset_is_rejected() {
        let mut store = store();
        let err = store
            .dispatch(Action::ResetTimer {
                kind: TimerKind::Rest,
                to_secs: 0,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Timer(_)));
    }
}

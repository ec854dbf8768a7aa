//! Workout controller
//!
//! Owns the [`SessionStore`] for the active workout and connects it to the
//! outside world:
//!
//! - keeps one [`Ticker`](lift_timer::Ticker) per running timer and feeds
//!   their ticks back into the store
//! - plays feedback for completed sets and expired rest
//! - loads routines and the catalog, saves finished workouts
//!
//! Backend calls are made once. A failure is kept as an [`Alert`] and the
//! session stays as it was, so the user can retry by repeating the action.

use crate::config::WorkoutConfig;
use crate::dto::{parse_catalog, parse_routine, CatalogExercise, FinishedWorkout};
use crate::error::{Alert, BoundaryError, CoreError};
use crate::library::ExerciseLibrary;
use crate::service::{FeedbackService, KeyValueStore, RemoteDataService, FALLBACK_PATTERN};
use crate::store::{Action, SessionStore, StoreEvent};
use chrono::Utc;
use lift_session::WorkoutSession;
use lift_timer::{Tick, TickerSet, TimerKind};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drives one workout at a time
pub struct WorkoutController {
    config: WorkoutConfig,
    remote: Arc<dyn RemoteDataService>,
    feedback: Arc<dyn FeedbackService>,
    library: ExerciseLibrary,
    store: Option<SessionStore>,
    tickers: TickerSet,
    ticks: mpsc::UnboundedReceiver<Tick>,
    on_screen: bool,
    alert: Option<Alert>,
}

impl std::fmt::Debug for WorkoutController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutController")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("tickers", &self.tickers)
            .field("on_screen", &self.on_screen)
            .field("alert", &self.alert)
            .finish_non_exhaustive()
    }
}

impl WorkoutController {
    /// Create a controller with no active workout
    ///
    /// # Errors
    /// `CoreError::Config` for invalid settings
    pub fn new(
        config: WorkoutConfig,
        remote: Arc<dyn RemoteDataService>,
        kv: Arc<dyn KeyValueStore>,
        feedback: Arc<dyn FeedbackService>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let (tickers, ticks) = TickerSet::new(config.tick_period())?;
        let library = ExerciseLibrary::new(kv, config.recent_limit);
        Ok(Self {
            config,
            remote,
            feedback,
            library,
            store: None,
            tickers,
            ticks,
            on_screen: true,
            alert: None,
        })
    }

    /// Start an empty workout with the duration clock running
    ///
    /// # Errors
    /// `CoreError::SessionActive` when a workout is already in progress
    pub fn start_empty(&mut self, name: &str) -> Result<(), CoreError> {
        self.begin(WorkoutSession::new(name))
    }

    /// Start a workout pre-filled from a routine
    ///
    /// # Errors
    /// `CoreError::SessionActive`, or the fetch/parse failure (also kept
    /// as the current alert)
    pub async fn start_from_routine(&mut self, routine_id: &str) -> Result<(), CoreError> {
        if self.store.is_some() {
            return Err(CoreError::SessionActive);
        }
        let routine = match self.remote.fetch_routine(routine_id).await {
            Ok(value) => parse_routine(value).map_err(CoreError::from),
            Err(e) => Err(e.into()),
        };
        let routine = routine.map_err(|e| self.report(e))?;

        let mut session = WorkoutSession::new(routine.name.clone()).with_routine(routine.id.clone());
        for spec in routine.exercises {
            session.add_exercise(spec);
        }
        self.begin(session)
    }

    fn begin(&mut self, mut session: WorkoutSession) -> Result<(), CoreError> {
        if self.store.is_some() {
            return Err(CoreError::SessionActive);
        }
        session.clock.start();
        tracing::info!(
            session_id = %session.id,
            name = %session.name,
            exercises = session.exercises().len(),
            "workout started"
        );
        self.store = Some(SessionStore::new(session, &self.config)?);
        self.sync_tickers()
    }

    /// Backend catalog followed by the user's custom exercises
    ///
    /// # Errors
    /// Fetch or parse failure, also kept as the current alert
    pub async fn catalog(&mut self) -> Result<Vec<CatalogExercise>, CoreError> {
        let fetched = match self.remote.fetch_catalog().await {
            Ok(value) => parse_catalog(value).map_err(CoreError::from),
            Err(e) => Err(e.into()),
        };
        let mut catalog = fetched.map_err(|e| self.report(e))?;

        match self.library.custom_exercises().await {
            Ok(custom) => catalog.extend(custom),
            Err(e) => tracing::warn!(error = %e, "custom exercises unavailable"),
        }
        Ok(catalog)
    }

    /// Apply an action to the active workout, then play feedback and
    /// start or stop tickers to match the timers
    ///
    /// # Errors
    /// `CoreError::NoActiveSession`, or whatever rejected the action
    pub async fn dispatch(&mut self, action: Action) -> Result<(), CoreError> {
        let store = self.store.as_mut().ok_or(CoreError::NoActiveSession)?;
        let mut rearmed = match &action {
            Action::ResetTimer { kind, .. } => vec![*kind],
            _ => Vec::new(),
        };
        let toggled = matches!(action, Action::ToggleSet { .. });
        let result = store.dispatch(action);
        let events = store.drain_events();
        if toggled && events.iter().any(|e| matches!(e, StoreEvent::RestStarted { .. })) {
            rearmed.push(TimerKind::Rest);
        }

        for event in events {
            self.react(event).await;
        }
        if result.is_ok() {
            // a reset timer must not see ticks queued for its old value
            for kind in rearmed {
                self.tickers.pause(kind);
            }
        }
        self.sync_tickers()?;
        result.map_err(|e| self.report(e))
    }

    /// Apply a tick from the ticker channel
    ///
    /// Ticks from a ticker that has since been cancelled or replaced are
    /// dropped. Returns whether the tick was applied.
    pub async fn on_tick(&mut self, tick: Tick) -> bool {
        if self.store.is_none() || !self.tickers.is_live(&tick) {
            tracing::trace!(kind = ?tick.kind, generation = tick.generation, "stale tick dropped");
            return false;
        }
        if let Err(e) = self.dispatch(Action::Tick(tick.kind)).await {
            tracing::debug!(error = %e, "tick dropped");
        }
        true
    }

    /// Wait for the next tick
    ///
    /// Returns `None` only when the controller's ticker channel is closed.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.recv().await
    }

    /// Apply every tick already waiting in the channel
    ///
    /// Returns how many were applied; stale ticks are drained but not counted.
    pub async fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(tick) = self.ticks.try_recv() {
            if self.on_tick(tick).await {
                applied += 1;
            }
        }
        applied
    }

    /// Save the workout and end it
    ///
    /// The duration clock stops first. The record holds completed sets only.
    /// On a failed save the workout stays active (paused) and an alert is
    /// raised; calling `finish` again retries.
    ///
    /// # Errors
    /// `CoreError::NoActiveSession`, or the save failure
    pub async fn finish(&mut self) -> Result<FinishedWorkout, CoreError> {
        self.dispatch(Action::PauseTimer(TimerKind::Duration)).await?;
        let store = self.store.as_ref().ok_or(CoreError::NoActiveSession)?;
        let record = FinishedWorkout::from_session(store.session(), Utc::now());

        let payload = serde_json::to_value(&record).map_err(|e| {
            CoreError::from(BoundaryError::Malformed {
                entity: "finished workout",
                reason: e.to_string(),
            })
        });
        let saved = match payload {
            Ok(value) => self.remote.save_workout(value).await.map_err(CoreError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            tracing::warn!(session_id = %record.session_id, error = %e, "workout save failed");
            return Err(self.report(e));
        }

        let used: Vec<CatalogExercise> = record
            .exercises
            .iter()
            .filter_map(|ex| {
                ex.exercise_id.clone().map(|id| CatalogExercise {
                    id,
                    name: ex.name.clone(),
                    category: None,
                    equipment: None,
                    custom: false,
                })
            })
            .collect();
        if let Err(e) = self.library.record_recent(&used).await {
            tracing::warn!(error = %e, "recent exercises not updated");
        }

        self.store = None;
        self.tickers.clear();
        self.alert = None;
        tracing::info!(
            session_id = %record.session_id,
            duration_secs = record.duration_secs,
            total_volume = record.total_volume,
            "workout finished"
        );
        Ok(record)
    }

    /// Drop the active workout without saving
    pub fn discard(&mut self) -> Option<WorkoutSession> {
        self.tickers.clear();
        let session = self.store.take().map(SessionStore::into_session);
        if let Some(session) = &session {
            tracing::info!(session_id = %session.id, "workout discarded");
        }
        session
    }

    /// Stop every ticker; the workout itself is kept
    pub fn leave_screen(&mut self) {
        self.on_screen = false;
        self.tickers.clear();
        tracing::debug!("tickers cleared");
    }

    /// Restart tickers for the timers that are running
    ///
    /// # Errors
    /// Ticker spawn failure
    pub fn return_to_screen(&mut self) -> Result<(), CoreError> {
        self.on_screen = true;
        self.sync_tickers()
    }

    fn sync_tickers(&mut self) -> Result<(), CoreError> {
        for kind in TimerKind::ALL {
            let wanted = self.on_screen && self.store.as_ref().is_some_and(|s| s.timer_active(kind));
            if wanted {
                self.tickers.resume(kind)?;
            } else {
                self.tickers.pause(kind);
            }
        }
        Ok(())
    }

    async fn react(&self, event: StoreEvent) {
        match event {
            StoreEvent::SetCompleted { .. } => {
                if let Err(e) = self.feedback.set_completed().await {
                    tracing::debug!(error = %e, "set feedback failed");
                    self.vibrate_fallback().await;
                }
            }
            StoreEvent::RestExpired => {
                for _ in 0..self.config.alarm_repeats {
                    if let Err(e) = self.feedback.rest_alarm().await {
                        tracing::debug!(error = %e, "rest alarm failed");
                        self.vibrate_fallback().await;
                        break;
                    }
                }
            }
            StoreEvent::RestStarted { .. }
            | StoreEvent::RestReset { .. }
            | StoreEvent::FlashRaised(_)
            | StoreEvent::FlashCleared => {}
        }
    }

    async fn vibrate_fallback(&self) {
        if let Err(e) = self.feedback.vibrate(FALLBACK_PATTERN.to_vec()).await {
            tracing::debug!(error = %e, "vibration failed");
        }
    }

    fn report(&mut self, error: CoreError) -> CoreError {
        if let Some(alert) = error.alert() {
            self.alert = Some(alert);
        }
        error
    }

    /// Active workout state
    #[inline]
    #[must_use]
    pub fn store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    /// Active workout
    #[must_use]
    pub fn session(&self) -> Option<&WorkoutSession> {
        self.store.as_ref().map(SessionStore::session)
    }

    /// Custom and recent exercises
    #[inline]
    #[must_use]
    pub fn library(&self) -> &ExerciseLibrary {
        &self.library
    }

    /// Alert waiting to be shown
    #[inline]
    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Dismiss the current alert
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    /// Whether a ticker is live for `kind`
    #[inline]
    #[must_use]
    pub fn ticker_running(&self, kind: TimerKind) -> bool {
        self.tickers.is_running(kind)
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }
}

//! Testing utilities for the Lift workspace
//!
//! In-memory collaborators and session fixtures.

#![allow(missing_docs)]

use lift_core::{FeedbackService, KeyValueStore, RemoteDataService, ServiceError};
use lift_session::{ExerciseId, ExerciseSpec, SetPatch, WorkoutSession};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Key-value store backed by a map
#[derive(Debug, Default)]
pub struct InMemoryKv {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryKv {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        if *self.fail_writes.lock() {
            return Err(ServiceError::Storage("disk full".to_string()));
        }
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ServiceError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Remote service with canned responses and a record of saved workouts
#[derive(Debug)]
pub struct FakeRemote {
    catalog: Mutex<Value>,
    routines: Mutex<HashMap<String, Value>>,
    saved: Mutex<Vec<Value>>,
    failures_left: Mutex<u32>,
    save_calls: Mutex<u32>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            catalog: Mutex::new(sample_catalog()),
            routines: Mutex::new(HashMap::new()),
            saved: Mutex::new(Vec::new()),
            failures_left: Mutex::new(0),
            save_calls: Mutex::new(0),
        }
    }
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_routine(self: Arc<Self>, id: &str, routine: Value) -> Arc<Self> {
        self.routines.lock().insert(id.to_string(), routine);
        self
    }

    pub fn set_catalog(&self, catalog: Value) {
        *self.catalog.lock() = catalog;
    }

    /// Fail the next `n` requests of any kind
    pub fn fail_next(&self, n: u32) {
        *self.failures_left.lock() = n;
    }

    pub fn saved(&self) -> Vec<Value> {
        self.saved.lock().clone()
    }

    pub fn save_calls(&self) -> u32 {
        *self.save_calls.lock()
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        let mut left = self.failures_left.lock();
        if *left > 0 {
            *left -= 1;
            return Err(ServiceError::Request("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteDataService for FakeRemote {
    async fn fetch_catalog(&self) -> Result<Value, ServiceError> {
        self.take_failure()?;
        Ok(self.catalog.lock().clone())
    }

    async fn fetch_routine(&self, routine_id: &str) -> Result<Value, ServiceError> {
        self.take_failure()?;
        self.routines
            .lock()
            .get(routine_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("routine {routine_id}")))
    }

    async fn save_workout(&self, record: Value) -> Result<(), ServiceError> {
        *self.save_calls.lock() += 1;
        self.take_failure()?;
        self.saved.lock().push(record);
        Ok(())
    }
}

/// Feedback call as seen by [`RecordingFeedback`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackCall {
    SetCompleted,
    RestAlarm,
    Vibrate(Vec<u64>),
}

/// Feedback service that records calls and can be muted
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    calls: Mutex<Vec<FeedbackCall>>,
    muted: Mutex<bool>,
}

impl RecordingFeedback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make sound calls fail; vibration still works
    pub fn mute(&self) {
        *self.muted.lock() = true;
    }

    pub fn calls(&self) -> Vec<FeedbackCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &FeedbackCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn sound(&self, call: FeedbackCall) -> Result<(), ServiceError> {
        self.calls.lock().push(call);
        if *self.muted.lock() {
            Err(ServiceError::Feedback("audio muted".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl FeedbackService for RecordingFeedback {
    async fn set_completed(&self) -> Result<(), ServiceError> {
        self.sound(FeedbackCall::SetCompleted)
    }

    async fn rest_alarm(&self) -> Result<(), ServiceError> {
        self.sound(FeedbackCall::RestAlarm)
    }

    async fn vibrate(&self, pattern: Vec<u64>) -> Result<(), ServiceError> {
        self.calls.lock().push(FeedbackCall::Vibrate(pattern));
        Ok(())
    }
}

pub fn sample_catalog() -> Value {
    json!([
        {"id": 1, "name": "Bench Press", "category": "Chest", "equipment": "Barbell"},
        {"id": 2, "name": "Squat", "category": "Legs", "equipment": "Barbell"},
        {"id": "row-3", "name": "Cable Row", "category": "Back"}
    ])
}

pub fn sample_routine() -> Value {
    json!({
        "id": 42,
        "name": "Upper A",
        "exercises": [
            {"exercise_id": 1, "name": "Bench Press", "sets": 3},
            {"exercise_id": "row-3", "name": "Cable Row", "sets": 2, "notes": "pause at chest"}
        ]
    })
}

/// Session with one exercise per name, each with `sets` empty sets
pub fn session_with(names: &[&str], sets: u32) -> (WorkoutSession, Vec<ExerciseId>) {
    let mut session = WorkoutSession::new("Fixture");
    let ids = names
        .iter()
        .map(|name| session.add_exercise(ExerciseSpec::new(*name).with_sets(sets)))
        .collect();
    (session, ids)
}

/// Fill in and complete set `index` of `exercise`
pub fn complete_set(session: &mut WorkoutSession, exercise: ExerciseId, index: usize, weight: f64, reps: u32) {
    let set_id = session.exercise(exercise).unwrap().sets[index].id;
    session
        .update_set(exercise, set_id, SetPatch::new().weight(weight).reps(reps))
        .unwrap();
    session.toggle_set_completion(exercise, set_id).unwrap();
}

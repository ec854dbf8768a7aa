use lift_core::{Action, SessionStore, StoreEvent, WorkoutConfig};
use lift_session::{ExerciseSpec, SessionStats, SetPatch, WorkoutSession};
use lift_timer::TimerKind;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddExercise,
    RemoveExercise(usize),
    AddSet(usize),
    RemoveSet(usize, usize),
    Fill(usize, usize, u32, u32),
    Toggle(usize, usize),
    Group(usize, usize),
    Ungroup(usize),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddExercise),
        (0usize..8).prop_map(Op::RemoveExercise),
        (0usize..8).prop_map(Op::AddSet),
        (0usize..8, 0usize..8).prop_map(|(e, s)| Op::RemoveSet(e, s)),
        (0usize..8, 0usize..8, 0u32..150, 0u32..15).prop_map(|(e, s, w, r)| Op::Fill(e, s, w, r)),
        (0usize..8, 0usize..8).prop_map(|(e, s)| Op::Toggle(e, s)),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Group(a, b)),
        (0usize..8).prop_map(Op::Ungroup),
        Just(Op::Tick),
    ]
}

fn to_action(store: &SessionStore, op: &Op) -> Option<Action> {
    let session = store.session();
    let exercise = |i: usize| session.exercises().get(i % session.exercises().len().max(1));
    let set = |e: usize, s: usize| {
        let ex = exercise(e)?;
        let set = ex.sets.get(s % ex.sets.len().max(1))?;
        Some((ex.id, set.id))
    };

    Some(match *op {
        Op::AddExercise => Action::AddExercise(ExerciseSpec::new("Prop").with_sets(2)),
        Op::RemoveExercise(i) => Action::RemoveExercise(exercise(i)?.id),
        Op::AddSet(i) => Action::AddSet(exercise(i)?.id),
        Op::RemoveSet(e, s) => {
            let (exercise_id, set_id) = set(e, s)?;
            Action::RemoveSet { exercise_id, set_id }
        }
        Op::Fill(e, s, w, r) => {
            let (exercise_id, set_id) = set(e, s)?;
            Action::UpdateSet {
                exercise_id,
                set_id,
                patch: SetPatch::new().weight(f64::from(w)).reps(r),
            }
        }
        Op::Toggle(e, s) => {
            let (exercise_id, set_id) = set(e, s)?;
            Action::ToggleSet { exercise_id, set_id }
        }
        Op::Group(a, b) => Action::CreateOrJoinSuperset {
            exercise_ids: vec![exercise(a)?.id],
            anchor: exercise(b)?.id,
        },
        Op::Ungroup(i) => Action::RemoveFromSuperset(exercise(i)?.id),
        Op::Tick => Action::Tick(TimerKind::Duration),
    })
}

proptest! {
    #[test]
    fn prop_store_stays_consistent(ops in proptest::collection::vec(op(), 1..60)) {
        let mut store = SessionStore::new(WorkoutSession::new("Prop"), &WorkoutConfig::default()).unwrap();

        for op in &ops {
            let Some(action) = to_action(&store, op) else { continue };
            let before = store.session().clone();
            if store.dispatch(action).is_err() {
                prop_assert_eq!(store.session(), &before);
            }

            let session = store.session();
            prop_assert_eq!(store.stats(), &SessionStats::compute(session));
            prop_assert!(session.supersets().check_invariants().is_ok());
            for exercise in session.exercises() {
                let orders: Vec<u32> = exercise.sets.iter().map(|s| s.order).collect();
                let expected: Vec<u32> = (0..exercise.sets.len() as u32).collect();
                prop_assert_eq!(orders, expected);
                if let Some(group) = session.supersets().group_of(exercise.id) {
                    prop_assert!(session.supersets().members(group).unwrap().len() >= 2);
                }
            }
            for (_, members) in session.supersets().iter() {
                for id in members {
                    prop_assert!(session.exercise(*id).is_some());
                }
            }
        }
    }
}

#[test]
fn test_flash_cleared_by_next_edit() {
    let mut session = WorkoutSession::new("Flash");
    let ex = session.add_exercise(ExerciseSpec::new("Curl"));
    let set = session.exercise(ex).unwrap().sets[0].id;
    let mut store = SessionStore::new(session, &WorkoutConfig::default()).unwrap();

    assert!(store
        .dispatch(Action::ToggleSet {
            exercise_id: ex,
            set_id: set
        })
        .is_err());
    assert!(store.flash().is_some());

    store
        .dispatch(Action::UpdateSet {
            exercise_id: ex,
            set_id: set,
            patch: SetPatch::new().weight(12.5),
        })
        .unwrap();

    assert!(store.flash().is_none());
    let events = store.drain_events();
    assert_eq!(events.last(), Some(&StoreEvent::FlashCleared));
}

#[test]
fn test_completed_set_can_be_edited_to_blank() {
    let mut session = WorkoutSession::new("Edit");
    let ex = session.add_exercise(ExerciseSpec::new("Row"));
    let set = session.exercise(ex).unwrap().sets[0].id;
    session
        .update_set(ex, set, SetPatch::new().weight(60.0).reps(10))
        .unwrap();
    session.toggle_set_completion(ex, set).unwrap();
    let mut store = SessionStore::new(session, &WorkoutConfig::default()).unwrap();
    assert_eq!(store.stats().total_volume, 600.0);

    store
        .dispatch(Action::UpdateSet {
            exercise_id: ex,
            set_id: set,
            patch: SetPatch::new().clear_reps(),
        })
        .unwrap();

    let stored = store.session().exercise(ex).unwrap().set(set).unwrap();
    assert!(stored.completed);
    assert_eq!(stored.reps, None);
    assert_eq!(store.stats().total_volume, 0.0);
    assert_eq!(store.stats().completed_sets, 1);
}

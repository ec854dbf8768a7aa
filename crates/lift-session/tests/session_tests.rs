use lift_session::{
    ExerciseId, ExercisePatch, ExerciseSpec, SessionError, SessionStats, SetPatch, WorkoutSession,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn log_set(session: &mut WorkoutSession, ex: ExerciseId, idx: usize, weight: f64, reps: u32, done: bool) {
    let set = session.exercise(ex).unwrap().sets[idx].id;
    session
        .update_set(ex, set, SetPatch::new().weight(weight).reps(reps))
        .unwrap();
    if done {
        session.toggle_set_completion(ex, set).unwrap();
    }
}

#[test]
fn test_volume_counts_completed_sets_only() {
    let mut session = WorkoutSession::new("Push");
    let ex = session.add_exercise(ExerciseSpec::new("Bench Press").with_sets(2));
    log_set(&mut session, ex, 0, 100.0, 10, true);
    log_set(&mut session, ex, 1, 0.0, 10, false);

    let stats = SessionStats::compute(&session);

    assert_eq!(stats.total_volume, 1000.0);
    assert_eq!(stats.completed_sets, 1);
    assert_eq!(stats.total_sets, 2);
    assert_eq!(stats.exercise_count, 1);
}

#[test]
fn test_zero_weight_set_cannot_complete() {
    let mut session = WorkoutSession::new("Push");
    let ex = session.add_exercise(ExerciseSpec::new("Dips"));
    let set = session.exercise(ex).unwrap().sets[0].id;
    session
        .update_set(ex, set, SetPatch::new().weight(0.0).reps(10))
        .unwrap();

    let err = session.toggle_set_completion(ex, set).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(SessionStats::compute(&session).completed_sets, 0);
}

#[test]
fn test_superset_example_from_anchor() {
    let mut session = WorkoutSession::new("Pull");
    let a = session.add_exercise(ExerciseSpec::new("A"));
    let b = session.add_exercise(ExerciseSpec::new("B"));
    let c = session.add_exercise(ExerciseSpec::new("C"));

    let group = session.create_or_join_superset(&[b, c], a).unwrap();
    let members: Vec<_> = session.supersets().members(group).unwrap().iter().copied().collect();
    let mut expected = vec![a, b, c];
    expected.sort();
    assert_eq!(members, expected);
    assert_eq!(session.supersets().len(), 1);

    session.remove_from_superset(b).unwrap();
    let members: Vec<_> = session.supersets().members(group).unwrap().iter().copied().collect();
    let mut expected = vec![a, c];
    expected.sort();
    assert_eq!(members, expected);
}

#[test]
fn test_pair_superset_dissolves_on_remove() {
    let mut session = WorkoutSession::new("Pull");
    let a = session.add_exercise(ExerciseSpec::new("A"));
    let b = session.add_exercise(ExerciseSpec::new("B"));
    session.create_or_join_superset(&[a], b).unwrap();

    let ungrouped = session.remove_from_superset(b).unwrap();

    assert_eq!(ungrouped.len(), 2);
    assert!(session.supersets().is_empty());
    assert_eq!(
        session.remove_from_superset(a),
        Err(SessionError::NotInSuperset(a))
    );
}

#[test]
fn test_session_serializes_with_groups() {
    let mut session = WorkoutSession::new("Legs");
    let a = session.add_exercise(ExerciseSpec::new("Squat").with_notes("belt"));
    let b = session.add_exercise(ExerciseSpec::new("Lunge"));
    session.create_or_join_superset(&[b], a).unwrap();
    session.clock.start();
    session.clock.tick();

    let json = serde_json::to_string(&session).unwrap();
    let back: WorkoutSession = serde_json::from_str(&json).unwrap();

    assert_eq!(back, session);
    assert_eq!(back.duration_secs(), 1);
    assert!(back.supersets().check_invariants().is_ok());
}

#[test]
fn test_restored_session_drops_unknown_group_members() {
    let mut session = WorkoutSession::new("Legs");
    let a = session.add_exercise(ExerciseSpec::new("Squat"));
    let b = session.add_exercise(ExerciseSpec::new("Lunge"));
    let c = session.add_exercise(ExerciseSpec::new("Step Up"));
    session.create_or_join_superset(&[b, c], a).unwrap();

    let mut value = serde_json::to_value(&session).unwrap();
    value["exercises"].as_array_mut().unwrap().pop();
    let back: WorkoutSession = serde_json::from_value(value.clone()).unwrap();

    assert_eq!(back.exercises().len(), 2);
    assert_eq!(back.supersets().group_of(c), None);
    let group = back.supersets().group_of(a).unwrap();
    assert_eq!(back.supersets().members(group).unwrap().len(), 2);
    back.supersets().check_invariants().unwrap();

    value["exercises"].as_array_mut().unwrap().pop();
    let back: WorkoutSession = serde_json::from_value(value).unwrap();
    assert!(back.supersets().is_empty());
    assert_eq!(back.supersets().group_of(a), None);
}

#[test]
fn test_restored_session_renumbers_sets_and_rejects_duplicates() {
    let mut session = WorkoutSession::new("Pull");
    let ex = session.add_exercise(ExerciseSpec::new("Row").with_sets(3));
    let ids: Vec<_> = session.exercise(ex).unwrap().sets.iter().map(|s| s.id).collect();

    let mut value = serde_json::to_value(&session).unwrap();
    let sets = value["exercises"][0]["sets"].as_array_mut().unwrap();
    sets[0]["order"] = serde_json::json!(9);
    sets[2]["order"] = serde_json::json!(4);
    let back: WorkoutSession = serde_json::from_value(value.clone()).unwrap();

    let restored = &back.exercise(ex).unwrap().sets;
    let order: Vec<_> = restored.iter().map(|s| (s.id, s.order)).collect();
    assert_eq!(order, vec![(ids[1], 0), (ids[2], 1), (ids[0], 2)]);

    let twice = value["exercises"][0].clone();
    value["exercises"].as_array_mut().unwrap().push(twice);
    assert!(serde_json::from_value::<WorkoutSession>(value).is_err());
}

fn session_with(n: usize) -> WorkoutSession {
    let mut session = WorkoutSession::new("Prop");
    for i in 0..n {
        let ex = session.add_exercise(ExerciseSpec::new(format!("Ex {i}")).with_sets(2));
        session
            .update_exercise(ex, ExercisePatch::notes(format!("note {i}")))
            .unwrap();
        log_set(&mut session, ex, 0, 20.0 + i as f64, 5, i % 2 == 0);
    }
    session
}

proptest! {
    #[test]
    fn prop_reorder_by_permutation_yields_that_order(
        order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let mut session = session_with(6);
        let before = session.clone();
        let ids = session.exercise_ids();
        let permutation: Vec<ExerciseId> = order.iter().map(|&i| ids[i]).collect();

        session.reorder_exercises(&permutation).unwrap();

        prop_assert_eq!(session.exercise_ids(), permutation);
        for exercise in session.exercises() {
            let original = before.exercise(exercise.id).unwrap();
            prop_assert_eq!(&exercise.sets, &original.sets);
            prop_assert_eq!(&exercise.notes, &original.notes);
        }
    }

    #[test]
    fn prop_volume_matches_completed_sum_and_is_idempotent(
        sets in proptest::collection::vec((0u32..200, 0u32..20, any::<bool>()), 1..20)
    ) {
        let mut session = WorkoutSession::new("Prop");
        let ex = session.add_exercise(ExerciseSpec::new("Row").with_sets(sets.len() as u32));
        let mut expected = 0.0;
        for (idx, (weight, reps, done)) in sets.iter().enumerate() {
            let set = session.exercise(ex).unwrap().sets[idx].id;
            session
                .update_set(ex, set, SetPatch::new().weight(f64::from(*weight)).reps(*reps))
                .unwrap();
            if *done && session.toggle_set_completion(ex, set).is_ok() {
                expected += f64::from(*weight) * f64::from(*reps);
            }
        }

        let first = SessionStats::compute(&session);
        let second = SessionStats::compute(&session);
        prop_assert_eq!(first.total_volume, expected);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_set_orders_stay_contiguous(removals in proptest::collection::vec(0usize..10, 0..10)) {
        let mut session = WorkoutSession::new("Prop");
        let ex = session.add_exercise(ExerciseSpec::new("Curl").with_sets(10));
        for r in removals {
            let sets = &session.exercise(ex).unwrap().sets;
            if sets.is_empty() {
                break;
            }
            let id = sets[r % sets.len()].id;
            session.remove_set(ex, id).unwrap();
        }
        let orders: Vec<u32> = session.exercise(ex).unwrap().sets.iter().map(|s| s.order).collect();
        let expected: Vec<u32> = (0..orders.len() as u32).collect();
        prop_assert_eq!(orders, expected);
    }
}

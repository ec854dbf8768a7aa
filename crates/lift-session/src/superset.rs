//! Superset grouping
//!
//! Groups live in one arena keyed by [`SupersetId`] with a private
//! exercise -> group back-reference index. Both are written only by
//! `attach` and `detach`, so they cannot disagree.
//!
//! A group never has fewer than two members: removing the second-to-last
//! member dissolves it.

use crate::error::SessionError;
use crate::ids::{ExerciseId, SupersetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Display colours for superset groups, picked by `id % len`
pub const SUPERSET_PALETTE: [&str; 6] = [
    "#4F8EF7", "#F2994A", "#27AE60", "#BB6BD9", "#EB5757", "#F2C94C",
];

/// All superset groups of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GroupsRepr", into = "GroupsRepr")]
pub struct SupersetGroups {
    groups: BTreeMap<SupersetId, BTreeSet<ExerciseId>>,
    index: HashMap<ExerciseId, SupersetId>,
    next_id: u32,
}

impl SupersetGroups {
    /// No groups
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group containing `exercise_id`
    #[inline]
    #[must_use]
    pub fn group_of(&self, exercise_id: ExerciseId) -> Option<SupersetId> {
        self.index.get(&exercise_id).copied()
    }

    /// Members of a group
    #[inline]
    #[must_use]
    pub fn members(&self, group: SupersetId) -> Option<&BTreeSet<ExerciseId>> {
        self.groups.get(&group)
    }

    /// All groups, by id
    pub fn iter(&self) -> impl Iterator<Item = (SupersetId, &BTreeSet<ExerciseId>)> {
        self.groups.iter().map(|(id, members)| (*id, members))
    }

    /// Number of groups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group `exercise_ids` with `anchor`
    ///
    /// If the anchor is already grouped, the listed exercises join its group
    /// (leaving whatever group they were in). Otherwise a new group is
    /// allocated holding the anchor and the listed exercises.
    ///
    /// # Errors
    /// `SessionError::SupersetTooSmall` when a new group would have fewer
    /// than two distinct members, `SessionError::SupersetIdsExhausted` when
    /// no group id is left to allocate
    pub fn create_or_join(
        &mut self,
        exercise_ids: &[ExerciseId],
        anchor: ExerciseId,
    ) -> Result<SupersetId, SessionError> {
        let joining: BTreeSet<ExerciseId> = exercise_ids
            .iter()
            .copied()
            .filter(|id| *id != anchor)
            .collect();

        let group = match self.group_of(anchor) {
            Some(group) => group,
            None => {
                if joining.is_empty() {
                    return Err(SessionError::SupersetTooSmall(1));
                }
                let group = SupersetId(self.next_id);
                self.next_id = self
                    .next_id
                    .checked_add(1)
                    .ok_or(SessionError::SupersetIdsExhausted)?;
                self.attach(anchor, group);
                group
            }
        };

        for id in joining {
            if self.group_of(id) == Some(group) {
                continue;
            }
            self.detach(id);
            self.attach(id, group);
        }

        tracing::debug!(%group, members = self.groups.get(&group).map_or(0, BTreeSet::len), "superset updated");
        Ok(group)
    }

    /// Take `exercise_id` out of its group
    ///
    /// Returns every exercise that became ungrouped: the removed one and,
    /// when the group dissolved, its last remaining member.
    ///
    /// # Errors
    /// `SessionError::NotInSuperset` when the exercise is ungrouped
    pub fn remove(&mut self, exercise_id: ExerciseId) -> Result<Vec<ExerciseId>, SessionError> {
        if self.group_of(exercise_id).is_none() {
            return Err(SessionError::NotInSuperset(exercise_id));
        }
        Ok(self.detach(exercise_id))
    }

    /// Colour for a group
    #[inline]
    #[must_use]
    pub fn color_for(group: SupersetId) -> &'static str {
        SUPERSET_PALETTE[group.0 as usize % SUPERSET_PALETTE.len()]
    }

    /// Check that the arena and the index agree and no group is undersized
    ///
    /// # Errors
    /// `SessionError::InvariantViolation` describing the first mismatch
    pub fn check_invariants(&self) -> Result<(), SessionError> {
        let mut seen = 0usize;
        for (group, members) in &self.groups {
            if members.len() < 2 {
                return Err(SessionError::InvariantViolation(format!(
                    "{group} has {} member(s)",
                    members.len()
                )));
            }
            for member in members {
                if self.index.get(member) != Some(group) {
                    return Err(SessionError::InvariantViolation(format!(
                        "{member} listed in {group} but indexed elsewhere"
                    )));
                }
            }
            seen += members.len();
        }
        if seen != self.index.len() {
            return Err(SessionError::InvariantViolation(format!(
                "index holds {} exercises, groups hold {seen}",
                self.index.len()
            )));
        }
        Ok(())
    }

    /// Drop every member `keep` rejects, dissolving groups left undersized
    ///
    /// Returns the dropped members.
    pub(crate) fn retain_members(&mut self, mut keep: impl FnMut(ExerciseId) -> bool) -> Vec<ExerciseId> {
        let unknown: Vec<ExerciseId> = self.index.keys().copied().filter(|id| !keep(*id)).collect();
        for id in &unknown {
            self.detach(*id);
        }
        unknown
    }

    fn attach(&mut self, exercise_id: ExerciseId, group: SupersetId) {
        self.groups.entry(group).or_default().insert(exercise_id);
        self.index.insert(exercise_id, group);
    }

    /// Remove from the current group, dissolving it when <= 1 member is left
    fn detach(&mut self, exercise_id: ExerciseId) -> Vec<ExerciseId> {
        let Some(group) = self.index.remove(&exercise_id) else {
            return Vec::new();
        };
        let mut ungrouped = vec![exercise_id];

        let dissolve = match self.groups.get_mut(&group) {
            Some(members) => {
                members.remove(&exercise_id);
                members.len() <= 1
            }
            None => false,
        };

        if dissolve {
            if let Some(rest) = self.groups.remove(&group) {
                for member in rest {
                    self.index.remove(&member);
                    ungrouped.push(member);
                }
            }
            tracing::debug!(%group, "superset dissolved");
        }

        ungrouped
    }
}

#[derive(Serialize, Deserialize)]
struct GroupsRepr {
    groups: BTreeMap<SupersetId, BTreeSet<ExerciseId>>,
    next_id: u32,
}

impl From<GroupsRepr> for SupersetGroups {
    fn from(repr: GroupsRepr) -> Self {
        let mut out = Self {
            next_id: repr.next_id,
            ..Self::default()
        };
        for (group, members) in repr.groups {
            out.next_id = out.next_id.max(group.0.saturating_add(1));
            for member in members {
                out.detach(member);
                out.attach(member, group);
            }
        }
        // Drop groups that arrived undersized
        let undersized: Vec<SupersetId> = out
            .groups
            .iter()
            .filter(|(_, m)| m.len() < 2)
            .map(|(g, _)| *g)
            .collect();
        for group in undersized {
            if let Some(members) = out.groups.remove(&group) {
                for member in members {
                    out.index.remove(&member);
                }
            }
        }
        out
    }
}

impl From<SupersetGroups> for GroupsRepr {
    fn from(groups: SupersetGroups) -> Self {
        Self {
            groups: groups.groups,
            next_id: groups.next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: usize) -> Vec<ExerciseId> {
        (0..n).map(|_| ExerciseId::new()).collect()
    }

    #[test]
    fn anchor_ungrouped_creates_group_with_all_members() {
        let pool = ids(3);
        let (a, b, c) = (pool[0], pool[1], pool[2]);
        let mut groups = SupersetGroups::new();

        let g = groups.create_or_join(&[b, c], a).unwrap();

        assert_eq!(groups.len(), 1);
        let members: Vec<_> = groups.members(g).unwrap().iter().copied().collect();
        assert_eq!(members.len(), 3);
        for id in [a, b, c] {
            assert_eq!(groups.group_of(id), Some(g));
        }

        groups.remove(b).unwrap();
        assert_eq!(groups.members(g).unwrap().len(), 2);
        assert!(groups.members(g).unwrap().contains(&a));
        assert!(groups.members(g).unwrap().contains(&c));
        groups.check_invariants().unwrap();
    }

    #[test]
    fn removing_from_pair_dissolves_group() {
        let pool = ids(2);
        let (a, b) = (pool[0], pool[1]);
        let mut groups = SupersetGroups::new();
        groups.create_or_join(&[b], a).unwrap();

        let ungrouped = groups.remove(a).unwrap();

        assert!(groups.is_empty());
        assert_eq!(ungrouped.len(), 2);
        assert_eq!(groups.group_of(b), None);
    }

    #[test]
    fn joining_grouped_anchor_moves_member_between_groups() {
        let pool = ids(4);
        let (a, b, c, d) = (pool[0], pool[1], pool[2], pool[3]);
        let mut groups = SupersetGroups::new();
        let first = groups.create_or_join(&[b], a).unwrap();
        let second = groups.create_or_join(&[d], c).unwrap();
        assert_ne!(first, second);

        // d leaves {c, d}, which collapses
        let joined = groups.create_or_join(&[d], a).unwrap();

        assert_eq!(joined, first);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.members(first).unwrap().len(), 3);
        assert_eq!(groups.group_of(c), None);
        groups.check_invariants().unwrap();
    }

    #[test]
    fn lone_anchor_rejected() {
        let a = ExerciseId::new();
        let mut groups = SupersetGroups::new();
        assert_eq!(
            groups.create_or_join(&[a], a),
            Err(SessionError::SupersetTooSmall(1))
        );
        assert!(groups.is_empty());
    }

    #[test]
    fn remove_ungrouped_is_error() {
        let mut groups = SupersetGroups::new();
        assert!(matches!(
            groups.remove(ExerciseId::new()),
            Err(SessionError::NotInSuperset(_))
        ));
    }

    #[test]
    fn color_is_modulo_palette() {
        assert_eq!(SupersetGroups::color_for(SupersetId(0)), SUPERSET_PALETTE[0]);
        assert_eq!(
            SupersetGroups::color_for(SupersetId(SUPERSET_PALETTE.len() as u32 + 2)),
            SUPERSET_PALETTE[2]
        );
    }

    #[test]
    fn serde_rebuilds_index() {
        let pool = ids(2);
        let (a, b) = (pool[0], pool[1]);
        let mut groups = SupersetGroups::new();
        let g = groups.create_or_join(&[b], a).unwrap();

        let json = serde_json::to_string(&groups).unwrap();
        let back: SupersetGroups = serde_json::from_str(&json).unwrap();

        assert_eq!(back.group_of(a), Some(g));
        back.check_invariants().unwrap();
        assert_eq!(back, groups);
    }

    #[test]
    fn last_group_id_does_not_overflow() {
        let pool = ids(4);
        let json = format!(
            r#"{{"groups":{{"4294967295":["{}","{}"]}},"next_id":0}}"#,
            pool[0], pool[1]
        );
        let mut groups: SupersetGroups = serde_json::from_str(&json).unwrap();
        assert_eq!(groups.group_of(pool[0]), Some(SupersetId(u32::MAX)));

        assert_eq!(
            groups.create_or_join(&[pool[3]], pool[2]),
            Err(SessionError::SupersetIdsExhausted)
        );
        assert_eq!(groups.len(), 1);
        groups.check_invariants().unwrap();

        let empty: SupersetGroups =
            serde_json::from_str(r#"{"groups":{"4294967295":[]},"next_id":0}"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn retain_members_dissolves_pairs() {
        let pool = ids(3);
        let mut groups = SupersetGroups::new();
        let g = groups.create_or_join(&[pool[1], pool[2]], pool[0]).unwrap();

        let dropped = groups.retain_members(|id| id != pool[2]);
        assert_eq!(dropped, vec![pool[2]]);
        assert_eq!(groups.members(g).unwrap().len(), 2);

        groups.retain_members(|id| id == pool[0]);
        assert!(groups.is_empty());
        groups.check_invariants().unwrap();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Join(Vec<usize>, usize),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (proptest::collection::vec(0usize..8, 0..4), 0usize..8)
                .prop_map(|(ids, anchor)| Op::Join(ids, anchor)),
            (0usize..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_any_sequence(ops in proptest::collection::vec(op(), 0..64)) {
            let pool = ids(8);
            let mut groups = SupersetGroups::new();
            for op in ops {
                match op {
                    Op::Join(members, anchor) => {
                        let members: Vec<_> = members.into_iter().map(|i| pool[i]).collect();
                        let _ = groups.create_or_join(&members, pool[anchor]);
                    }
                    Op::Remove(i) => {
                        let _ = groups.remove(pool[i]);
                    }
                }
                prop_assert!(groups.check_invariants().is_ok());
            }
        }
    }
}

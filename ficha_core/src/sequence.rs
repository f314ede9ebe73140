//! Sequence Store: the ordered exercise slots of one plan.
//!
//! Every operation is a pure transform: it takes `&self` and returns a new
//! snapshot (or a failure), leaving the receiver untouched. The store knows
//! nothing about pairing; pair-aware editing lives in [`crate::pairing`].

use crate::{Error, ExerciseSlot, ExerciseSpec, PairRole, PairingError, Result, SlotId, TempId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

type StoreResult<T> = std::result::Result<T, PairingError>;

/// Ordered collection of exercise slots.
///
/// Serializes as the bare exercise list; deserializing goes through
/// [`Sequence::from_slots`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<ExerciseSlot>", try_from = "Vec<ExerciseSlot>")]
pub struct Sequence {
    slots: Vec<ExerciseSlot>,
}

impl Sequence {
    /// Empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an exercise list handed back by the persistence layer.
    ///
    /// Slots are ordered by their `order` field, then every invariant is
    /// checked; a list that breaks any of them is rejected as a whole.
    pub fn from_slots(mut slots: Vec<ExerciseSlot>) -> Result<Self> {
        slots.sort_by_key(|s| s.order);
        let seq = Self { slots };
        let errors = seq.validate();
        if !errors.is_empty() {
            return Err(Error::InvalidPlan(errors));
        }
        Ok(seq)
    }

    pub fn slots(&self) -> &[ExerciseSlot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<ExerciseSlot> {
        self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExerciseSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: &SlotId) -> Option<&ExerciseSlot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    /// Zero-based vector position of a slot
    pub fn position(&self, id: &SlotId) -> Option<usize> {
        self.slots.iter().position(|s| &s.id == id)
    }

    /// Slot with the given 1-based order
    pub fn at_order(&self, order: u32) -> Option<&ExerciseSlot> {
        let index = usize::try_from(order).ok()?.checked_sub(1)?;
        self.slots.get(index)
    }

    pub(crate) fn require_position(&self, id: &SlotId) -> StoreResult<usize> {
        self.position(id)
            .ok_or_else(|| PairingError::SlotNotFound(id.clone()))
    }

    pub(crate) fn slot_mut(&mut self, id: &SlotId) -> StoreResult<&mut ExerciseSlot> {
        self.slots
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| PairingError::SlotNotFound(id.clone()))
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [ExerciseSlot] {
        &mut self.slots
    }

    // ========================================================================
    // Structural primitives
    // ========================================================================

    /// Add a slot at the end with a fresh temporary id
    pub fn append(&self, spec: ExerciseSpec) -> (Sequence, ExerciseSlot) {
        let mut next = self.clone();
        let mut slot = ExerciseSlot::from_spec(TempId::new().into(), spec);
        slot.order = next.next_order();
        next.slots.push(slot.clone());
        (next, slot)
    }

    /// Insert a slot immediately after `anchor`, shifting later slots down
    pub fn insert_after(
        &self,
        anchor: &SlotId,
        spec: ExerciseSpec,
    ) -> StoreResult<(Sequence, ExerciseSlot)> {
        let index = self.require_position(anchor)? + 1;
        let mut next = self.clone();
        next.slots
            .insert(index, ExerciseSlot::from_spec(TempId::new().into(), spec));
        next.renumber_in_place();
        let slot = next.slots[index].clone();
        Ok((next, slot))
    }

    /// Delete a slot and close the gap
    pub fn remove(&self, id: &SlotId) -> StoreResult<Sequence> {
        let index = self.require_position(id)?;
        let mut next = self.clone();
        next.slots.remove(index);
        next.renumber_in_place();
        Ok(next)
    }

    /// Bring `b` next to `a`.
    ///
    /// An existing adjacency is preserved in whichever direction it holds;
    /// otherwise `b` is moved to immediately follow `a`. All other slots keep
    /// their relative order.
    pub fn move_adjacent(&self, a: &SlotId, b: &SlotId) -> StoreResult<Sequence> {
        let pos_a = self.require_position(a)?;
        let pos_b = self.require_position(b)?;

        if pos_a == pos_b || pos_a + 1 == pos_b || pos_b + 1 == pos_a {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let moved = next.slots.remove(pos_b);
        let anchor = if pos_b < pos_a { pos_a - 1 } else { pos_a };
        next.slots.insert(anchor + 1, moved);
        next.renumber_in_place();
        Ok(next)
    }

    /// Reassign `order` as `1..=N` following vector position
    pub fn renumber(&self) -> Sequence {
        let mut next = self.clone();
        next.renumber_in_place();
        next
    }

    /// Exchange two neighbouring position ranges (`first.end == second.start`)
    pub(crate) fn swap_ranges(&self, first: Range<usize>, second: Range<usize>) -> Sequence {
        debug_assert_eq!(first.end, second.start);
        let mut next = self.clone();
        let shift = first.len();
        next.slots[first.start..second.end].rotate_left(shift);
        next.renumber_in_place();
        next
    }

    /// Replace temporary ids with ids assigned by the persistence layer
    pub fn reconcile_ids(&self, assigned: &HashMap<TempId, String>) -> Sequence {
        let mut next = self.clone();
        for slot in &mut next.slots {
            if let SlotId::Temp(temp) = &slot.id {
                if let Some(stored) = assigned.get(temp) {
                    slot.id = SlotId::Stored(stored.clone());
                }
            }
        }
        next
    }

    fn next_order(&self) -> u32 {
        u32::try_from(self.slots.len() + 1).unwrap_or(u32::MAX)
    }

    fn renumber_in_place(&mut self) {
        for (order, slot) in (1u32..).zip(self.slots.iter_mut()) {
            slot.order = order;
        }
    }

    // ========================================================================
    // Invariant checks
    // ========================================================================

    /// List every invariant violation; empty when the sequence is consistent
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut groups: HashMap<_, Vec<usize>> = HashMap::new();

        for (index, slot) in self.slots.iter().enumerate() {
            let expected = index + 1;
            if usize::try_from(slot.order).ok() != Some(expected) {
                errors.push(format!(
                    "Exercise {} has order {}, expected {}",
                    slot.id, slot.order, expected
                ));
            }
            if !seen.insert(&slot.id) {
                errors.push(format!("Duplicate exercise id {}", slot.id));
            }
            if slot.name.trim().is_empty() {
                errors.push(format!("Exercise {} has empty name", slot.id));
            }
            if slot.set_count == 0 {
                errors.push(format!("Exercise {} has zero sets", slot.id));
            }
            if let Some(group) = slot.pairing.group_id() {
                groups.entry(group).or_default().push(index);
            }
        }

        for (group, members) in &groups {
            let [first, second] = members.as_slice() else {
                errors.push(format!(
                    "Group {} has {} members, expected 2",
                    group,
                    members.len()
                ));
                continue;
            };
            let (first, second) = (&self.slots[*first], &self.slots[*second]);

            if first.order.checked_add(1) != Some(second.order) {
                errors.push(format!(
                    "Group {} members {} and {} are not adjacent",
                    group, first.id, second.id
                ));
            }
            if first.pairing.role() != Some(PairRole::First)
                || second.pairing.role() != Some(PairRole::Second)
            {
                errors.push(format!("Group {} has inconsistent roles", group));
            }
            if first.rest_seconds != 0 {
                errors.push(format!(
                    "Group {}: first member {} rests {}s, expected 0",
                    group, first.id, first.rest_seconds
                ));
            }
            if first.set_count != second.set_count {
                errors.push(format!(
                    "Group {}: set counts differ ({} vs {})",
                    group, first.set_count, second.set_count
                ));
            }
        }

        errors
    }
}

impl TryFrom<Vec<ExerciseSlot>> for Sequence {
    type Error = Error;

    fn try_from(slots: Vec<ExerciseSlot>) -> Result<Self> {
        Self::from_slots(slots)
    }
}

impl From<Sequence> for Vec<ExerciseSlot> {
    fn from(seq: Sequence) -> Self {
        seq.slots
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a ExerciseSlot;
    type IntoIter = std::slice::Iter<'a, ExerciseSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> ExerciseSpec {
        ExerciseSpec::new(name, "Peito", "10-12")
    }

    fn build(names: &[&str]) -> (Sequence, Vec<SlotId>) {
        let mut seq = Sequence::new();
        let mut ids = Vec::new();
        for name in names {
            let (next, slot) = seq.append(spec(name));
            seq = next;
            ids.push(slot.id);
        }
        (seq, ids)
    }

    fn names(seq: &Sequence) -> Vec<&str> {
        seq.iter().map(|s| s.name.as_str()).collect()
    }

    fn orders(seq: &Sequence) -> Vec<u32> {
        seq.iter().map(|s| s.order).collect()
    }

    #[test]
    fn test_append_assigns_next_order() {
        let (seq, _) = build(&["A", "B", "C"]);
        assert_eq!(orders(&seq), vec![1, 2, 3]);
        assert!(seq.iter().all(|s| s.id.is_temp()));
    }

    #[test]
    fn test_append_leaves_original_untouched() {
        let (seq, _) = build(&["A"]);
        let before = seq.clone();
        let (next, _) = seq.append(spec("B"));
        assert_eq!(seq, before);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_insert_after_shifts_following() {
        let (seq, ids) = build(&["A", "B", "C"]);
        let (next, slot) = seq.insert_after(&ids[0], spec("X")).unwrap();
        assert_eq!(names(&next), vec!["A", "X", "B", "C"]);
        assert_eq!(orders(&next), vec![1, 2, 3, 4]);
        assert_eq!(slot.order, 2);
    }

    #[test]
    fn test_insert_after_missing_anchor() {
        let (seq, _) = build(&["A"]);
        let missing = SlotId::Stored("nope".into());
        let err = seq.insert_after(&missing, spec("X")).unwrap_err();
        assert_eq!(err, PairingError::SlotNotFound(missing));
    }

    #[test]
    fn test_remove_renumbers() {
        let (seq, ids) = build(&["A", "B", "C"]);
        let next = seq.remove(&ids[1]).unwrap();
        assert_eq!(names(&next), vec!["A", "C"]);
        assert_eq!(orders(&next), vec![1, 2]);
    }

    #[test]
    fn test_move_adjacent_far_apart_moves_second_after_first() {
        let (seq, ids) = build(&["A", "B", "C", "D"]);
        let next = seq.move_adjacent(&ids[0], &ids[3]).unwrap();
        assert_eq!(names(&next), vec!["A", "D", "B", "C"]);

        let next = seq.move_adjacent(&ids[3], &ids[0]).unwrap();
        assert_eq!(names(&next), vec!["B", "C", "D", "A"]);
        assert_eq!(orders(&next), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_move_adjacent_preserves_existing_adjacency() {
        let (seq, ids) = build(&["A", "B", "C"]);
        // B already precedes C: order stays
        assert_eq!(seq.move_adjacent(&ids[2], &ids[1]).unwrap(), seq);
        assert_eq!(seq.move_adjacent(&ids[1], &ids[2]).unwrap(), seq);
    }

    #[test]
    fn test_move_adjacent_missing_id() {
        let (seq, ids) = build(&["A", "B"]);
        let missing = SlotId::Stored("x".into());
        assert_eq!(
            seq.move_adjacent(&ids[0], &missing).unwrap_err(),
            PairingError::SlotNotFound(missing.clone())
        );
        assert_eq!(
            seq.move_adjacent(&missing, &ids[1]).unwrap_err(),
            PairingError::SlotNotFound(missing)
        );
    }

    #[test]
    fn test_renumber_is_idempotent() {
        let (seq, _) = build(&["A", "B"]);
        let mut scrambled = seq.clone();
        scrambled.slots_mut()[0].order = 7;
        scrambled.slots_mut()[1].order = 7;
        let once = scrambled.renumber();
        assert_eq!(orders(&once), vec![1, 2]);
        assert_eq!(once.renumber(), once);
    }

    #[test]
    fn test_swap_ranges() {
        let (seq, _) = build(&["A", "B", "C", "D"]);
        let next = seq.swap_ranges(0..1, 1..3);
        assert_eq!(names(&next), vec!["B", "C", "A", "D"]);
        assert_eq!(orders(&next), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reconcile_ids() {
        let (seq, ids) = build(&["A", "B"]);
        let SlotId::Temp(temp) = ids[0].clone() else {
            panic!("expected temp id");
        };
        let assigned = HashMap::from([(temp, "ex-1".to_string())]);
        let next = seq.reconcile_ids(&assigned);
        assert_eq!(next.slots()[0].id, SlotId::Stored("ex-1".into()));
        assert_eq!(next.slots()[1].id, ids[1]);
    }

    #[test]
    fn test_from_slots_sorts_and_validates() {
        let (seq, _) = build(&["A", "B", "C"]);
        let mut slots = seq.clone().into_slots();
        slots.reverse();
        let loaded = Sequence::from_slots(slots).unwrap();
        assert_eq!(loaded, seq);
    }

    #[test]
    fn test_from_slots_rejects_gaps() {
        let (seq, _) = build(&["A", "B"]);
        let mut slots = seq.into_slots();
        slots[1].order = 5;
        match Sequence::from_slots(slots) {
            Err(Error::InvalidPlan(errors)) => {
                assert!(errors.iter().any(|e| e.contains("expected 2")));
            }
            other => panic!("expected InvalidPlan, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_flags_orphan_group_member() {
        let (seq, _) = build(&["A", "B"]);
        let mut broken = seq.clone();
        broken.slots_mut()[0].pairing = crate::Pairing::Paired {
            group_id: crate::GroupId::mint(),
            role: PairRole::First,
        };
        let errors = broken.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("1 members"));
    }

    fn pair(seq: &mut Sequence, first: usize, second: usize) {
        let group_id = crate::GroupId::mint();
        let slots = seq.slots_mut();
        slots[first].pairing = crate::Pairing::Paired {
            group_id,
            role: PairRole::First,
        };
        slots[first].rest_seconds = 0;
        slots[second].pairing = crate::Pairing::Paired {
            group_id,
            role: PairRole::Second,
        };
    }

    #[test]
    fn test_from_slots_rejects_pair_at_max_order() {
        let (mut seq, _) = build(&["A", "B"]);
        pair(&mut seq, 0, 1);
        let mut slots = seq.into_slots();
        for slot in &mut slots {
            slot.order = u32::MAX;
        }
        match Sequence::from_slots(slots) {
            Err(Error::InvalidPlan(errors)) => {
                assert!(errors.iter().any(|e| e.contains("not adjacent")));
            }
            other => panic!("expected InvalidPlan, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let (mut seq, _) = build(&["A", "B"]);
        pair(&mut seq, 0, 1);
        let json = serde_json::to_value(&seq).unwrap();
        assert!(json.is_array());
        let loaded: Sequence = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(loaded, seq);

        let mut gapped = json;
        gapped[1]["order"] = serde_json::json!(5);
        let err = serde_json::from_value::<Sequence>(gapped).unwrap_err();
        assert!(err.to_string().contains("Invalid plan"));
    }
}

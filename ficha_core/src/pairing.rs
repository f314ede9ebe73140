//! Pairing Manager: Bi-Set groups on top of the Sequence Store.
//!
//! A Bi-Set is two adjacent slots sharing one set count and a single rest
//! period taken after the pair. The lower-order member is `first` and rests
//! 0 seconds; the higher-order member is `second` and carries the shared rest.
//!
//! Every function here takes a snapshot and returns a new one. On failure
//! nothing is returned but the error, so the caller's snapshot is unchanged.

use crate::sequence::Sequence;
use crate::types::require;
use crate::{
    Direction, ExercisePatch, ExerciseSlot, ExerciseSpec, GroupId, PairRole, Pairing,
    PairingError, SlotId,
};
use std::ops::Range;

/// Technique tag given to both members of a pair
pub const BI_SET_TECHNIQUE: &str = "Bi-Set";

/// Result of a pairing command
pub type PairingResult<T> = std::result::Result<T, PairingError>;

/// The two slots a new pair is made of
#[derive(Clone, Debug)]
pub enum PairInput {
    /// Slots already in the sequence
    Existing(SlotId, SlotId),
    /// Two new slots appended to the end
    New(ExerciseSpec, ExerciseSpec),
}

/// A pair as it currently sits in a sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairGroup {
    pub group_id: GroupId,
    pub first: SlotId,
    pub second: SlotId,
}

// ============================================================================
// Pair lifecycle
// ============================================================================

/// Group two slots into a Bi-Set under a freshly minted group id
pub fn create_pair(
    seq: &Sequence,
    input: PairInput,
    shared_set_count: u32,
    shared_rest_seconds: u32,
) -> PairingResult<Sequence> {
    check_set_count(shared_set_count)?;

    let (next, a, b) = match input {
        PairInput::Existing(a, b) => {
            if a == b {
                return Err(PairingError::InvalidPairSelection(a));
            }
            for id in [&a, &b] {
                let index = seq.require_position(id)?;
                if seq.slots()[index].pairing.is_paired() {
                    return Err(PairingError::AlreadyPaired(id.clone()));
                }
            }
            (seq.move_adjacent(&a, &b)?, a, b)
        }
        PairInput::New(spec_a, spec_b) => {
            spec_a.check_required()?;
            spec_b.check_required()?;
            let (next, slot_a) = seq.append(spec_a);
            let (next, slot_b) = next.append(spec_b);
            (next, slot_a.id, slot_b.id)
        }
    };

    link(
        next,
        &a,
        &b,
        GroupId::mint(),
        shared_set_count,
        shared_rest_seconds,
    )
}

/// Untag both members of a group, keeping their sets and rest.
///
/// `technique` replaces the Bi-Set tag; `None` clears it.
pub fn dissolve_pair(
    seq: &Sequence,
    group_id: GroupId,
    technique: Option<&str>,
) -> PairingResult<Sequence> {
    let mut next = seq.clone();
    let mut found = false;

    for slot in next.slots_mut() {
        if slot.pairing.group_id() == Some(group_id) {
            slot.pairing = Pairing::None;
            slot.technique = technique.map(str::to_owned);
            found = true;
        }
    }

    if !found {
        return Err(PairingError::GroupNotFound(group_id));
    }
    Ok(next)
}

/// Change the shared set count and rest of a pair
pub fn edit_pair(
    seq: &Sequence,
    group_id: GroupId,
    shared_set_count: u32,
    shared_rest_seconds: u32,
) -> PairingResult<Sequence> {
    check_set_count(shared_set_count)?;

    let mut next = seq.clone();
    let mut found = false;

    for slot in next.slots_mut() {
        let Pairing::Paired { group_id: g, role } = slot.pairing else {
            continue;
        };
        if g != group_id {
            continue;
        }
        slot.set_count = shared_set_count;
        if role == PairRole::Second {
            slot.rest_seconds = shared_rest_seconds;
        }
        found = true;
    }

    if !found {
        return Err(PairingError::GroupNotFound(group_id));
    }
    Ok(next)
}

/// Remove a slot; a paired slot's group is dissolved first so the sibling
/// is left standalone
pub fn delete_exercise(
    seq: &Sequence,
    id: &SlotId,
    technique: Option<&str>,
) -> PairingResult<Sequence> {
    let slot = seq
        .get(id)
        .ok_or_else(|| PairingError::SlotNotFound(id.clone()))?;

    match slot.pairing.group_id() {
        Some(group_id) => dissolve_pair(seq, group_id, technique)?.remove(id),
        None => seq.remove(id),
    }
}

/// All pairs in sequence order
pub fn groups(seq: &Sequence) -> Vec<PairGroup> {
    let slots = seq.slots();
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| match slot.pairing {
            Pairing::Paired {
                group_id,
                role: PairRole::First,
            } => {
                let second = slots
                    .get(index + 1)
                    .filter(|s| s.pairing.group_id() == Some(group_id))?;
                Some(PairGroup {
                    group_id,
                    first: slot.id.clone(),
                    second: second.id.clone(),
                })
            }
            _ => None,
        })
        .collect()
}

// ============================================================================
// Pair-aware slot editing
// ============================================================================

/// Validate a spec and append it
pub fn add_exercise(
    seq: &Sequence,
    spec: ExerciseSpec,
) -> PairingResult<(Sequence, ExerciseSlot)> {
    spec.validate()?;
    Ok(seq.append(spec))
}

/// Validate a spec and insert it after `anchor`.
///
/// Anchoring on the first member of a pair inserts after the whole pair.
pub fn insert_exercise(
    seq: &Sequence,
    anchor: &SlotId,
    spec: ExerciseSpec,
) -> PairingResult<(Sequence, ExerciseSlot)> {
    spec.validate()?;

    let index = seq.require_position(anchor)?;
    let block = block_at(seq, index);
    let last = &seq.slots()[block.end - 1];
    seq.insert_after(&last.id, spec)
}

/// Apply a patch to one slot.
///
/// Sets, rest and technique of a paired slot belong to the pair and can only
/// change through [`edit_pair`] or [`dissolve_pair`].
pub fn edit_exercise(
    seq: &Sequence,
    id: &SlotId,
    patch: ExercisePatch,
) -> PairingResult<Sequence> {
    let mut next = seq.clone();
    let slot = next.slot_mut(id)?;

    if slot.pairing.is_paired() {
        if patch.set_count.is_some_and(|v| v != slot.set_count) {
            return Err(PairingError::PairedFieldLocked { field: "setCount" });
        }
        if patch.rest_seconds.is_some_and(|v| v != slot.rest_seconds) {
            return Err(PairingError::PairedFieldLocked {
                field: "restSeconds",
            });
        }
        if patch.technique.as_ref().is_some_and(|t| t != &slot.technique) {
            return Err(PairingError::PairedFieldLocked { field: "technique" });
        }
    }

    if let Some(name) = patch.name {
        require("name", &name)?;
        slot.name = name;
    }
    if let Some(muscle_group) = patch.muscle_group {
        require("muscleGroup", &muscle_group)?;
        slot.muscle_group = muscle_group;
    }
    if let Some(rep_scheme) = patch.rep_scheme {
        require("repScheme", &rep_scheme)?;
        slot.rep_scheme = rep_scheme;
    }
    if let Some(set_count) = patch.set_count {
        check_set_count(set_count)?;
        slot.set_count = set_count;
    }
    if let Some(rest_seconds) = patch.rest_seconds {
        slot.rest_seconds = rest_seconds;
    }
    if let Some(notes) = patch.notes {
        slot.notes = notes;
    }
    if let Some(technique) = patch.technique {
        slot.technique = technique;
    }
    if let Some(video_ref) = patch.video_ref {
        slot.video_ref = video_ref;
    }

    Ok(next)
}

/// Move a slot one block up or down; a pair always moves as a unit.
///
/// Moving past either end leaves the sequence as it is.
pub fn move_exercise(
    seq: &Sequence,
    id: &SlotId,
    direction: Direction,
) -> PairingResult<Sequence> {
    let index = seq.require_position(id)?;
    let block = block_at(seq, index);

    let moved = match direction {
        Direction::Up if block.start > 0 => {
            let above = block_at(seq, block.start - 1);
            seq.swap_ranges(above, block)
        }
        Direction::Down if block.end < seq.len() => {
            let below = block_at(seq, block.end);
            seq.swap_ranges(block, below)
        }
        _ => seq.clone(),
    };
    Ok(moved)
}

// ============================================================================
// Helpers
// ============================================================================

fn check_set_count(set_count: u32) -> PairingResult<()> {
    if set_count == 0 {
        return Err(PairingError::InvalidSetCount(set_count));
    }
    Ok(())
}

/// Positions of the block (standalone slot or whole pair) containing `index`
fn block_at(seq: &Sequence, index: usize) -> Range<usize> {
    let slots = seq.slots();
    let slot = &slots[index];
    let same_group = |other: Option<&ExerciseSlot>| {
        other.is_some_and(|o| o.pairing.group_id() == slot.pairing.group_id())
    };

    match slot.pairing.role() {
        Some(PairRole::First) if same_group(slots.get(index + 1)) => index..index + 2,
        Some(PairRole::Second) if index > 0 && same_group(slots.get(index - 1)) => {
            index - 1..index + 1
        }
        _ => index..index + 1,
    }
}

/// Tag `a` and `b` (already adjacent) as a pair with the shared parameters
fn link(
    mut seq: Sequence,
    a: &SlotId,
    b: &SlotId,
    group_id: GroupId,
    shared_set_count: u32,
    shared_rest_seconds: u32,
) -> PairingResult<Sequence> {
    let (first, second) = if seq.require_position(a)? < seq.require_position(b)? {
        (a, b)
    } else {
        (b, a)
    };

    for (id, role, rest_seconds) in [
        (first, PairRole::First, 0),
        (second, PairRole::Second, shared_rest_seconds),
    ] {
        let slot = seq.slot_mut(id)?;
        slot.set_count = shared_set_count;
        slot.rest_seconds = rest_seconds;
        slot.technique = Some(BI_SET_TECHNIQUE.to_string());
        slot.pairing = Pairing::Paired { group_id, role };
    }

    Ok(seq)
}

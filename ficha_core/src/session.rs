//! Editing session over one plan's exercise sequence.
//!
//! The session keeps two snapshots: the last committed one and a staging
//! copy. Each [`Command`] builds a new staging snapshot from the current one
//! and swaps it in only when the command succeeds. `commit` publishes the
//! staging snapshot; `discard` throws it away.

use crate::pairing::{self, PairInput, PairingResult};
use crate::sequence::Sequence;
use crate::{Direction, ExercisePatch, ExerciseSpec, GroupId, PairingError, SlotId, TempId};
use std::collections::HashMap;

/// A single editing command issued by the caller.
///
/// Commands are applied atomically: either the whole command takes effect
/// or the staging snapshot is left exactly as it was.
#[derive(Clone, Debug)]
pub enum Command {
    /// Append a new exercise.
    AddExercise(ExerciseSpec),

    /// Insert a new exercise after an existing one.
    InsertExercise { after: SlotId, spec: ExerciseSpec },

    /// Change fields of one exercise.
    EditExercise { id: SlotId, patch: ExercisePatch },

    /// Remove an exercise, dissolving its Bi-Set first.
    DeleteExercise(SlotId),

    /// Move an exercise (or its whole Bi-Set) one step.
    MoveExercise { id: SlotId, direction: Direction },

    /// Group two exercises into a Bi-Set.
    CreatePair {
        input: PairInput,
        set_count: u32,
        rest_seconds: u32,
    },

    /// Change the shared sets and rest of a Bi-Set.
    EditPair {
        group_id: GroupId,
        set_count: u32,
        rest_seconds: u32,
    },

    /// Split a Bi-Set back into two standalone exercises.
    DissolvePair(GroupId),
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddExercise(_) => "add_exercise",
            Command::InsertExercise { .. } => "insert_exercise",
            Command::EditExercise { .. } => "edit_exercise",
            Command::DeleteExercise(_) => "delete_exercise",
            Command::MoveExercise { .. } => "move_exercise",
            Command::CreatePair { .. } => "create_pair",
            Command::EditPair { .. } => "edit_pair",
            Command::DissolvePair(_) => "dissolve_pair",
        }
    }

    /// Run the command against a snapshot.
    ///
    /// `technique` is what a dissolved pair's members are re-tagged with.
    pub fn execute(self, seq: &Sequence, technique: Option<&str>) -> PairingResult<Sequence> {
        match self {
            Command::AddExercise(spec) => pairing::add_exercise(seq, spec).map(|(s, _)| s),
            Command::InsertExercise { after, spec } => {
                pairing::insert_exercise(seq, &after, spec).map(|(s, _)| s)
            }
            Command::EditExercise { id, patch } => pairing::edit_exercise(seq, &id, patch),
            Command::DeleteExercise(id) => pairing::delete_exercise(seq, &id, technique),
            Command::MoveExercise { id, direction } => {
                pairing::move_exercise(seq, &id, direction)
            }
            Command::CreatePair {
                input,
                set_count,
                rest_seconds,
            } => pairing::create_pair(seq, input, set_count, rest_seconds),
            Command::EditPair {
                group_id,
                set_count,
                rest_seconds,
            } => pairing::edit_pair(seq, group_id, set_count, rest_seconds),
            Command::DissolvePair(group_id) => pairing::dissolve_pair(seq, group_id, technique),
        }
    }
}

/// One caller's editing session over a plan
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    committed: Sequence,
    staging: Sequence,
    default_technique: Option<String>,
}

impl EditSession {
    /// Open a session on a committed snapshot
    pub fn open(committed: Sequence) -> Self {
        Self {
            staging: committed.clone(),
            committed,
            default_technique: None,
        }
    }

    /// Technique given to exercises whose Bi-Set is dissolved
    pub fn with_default_technique(mut self, technique: Option<String>) -> Self {
        self.default_technique = technique;
        self
    }

    pub fn staging(&self) -> &Sequence {
        &self.staging
    }

    pub fn committed(&self) -> &Sequence {
        &self.committed
    }

    /// True when staging holds edits not yet committed
    pub fn is_dirty(&self) -> bool {
        self.staging != self.committed
    }

    /// Apply one command to the staging snapshot
    pub fn apply(&mut self, command: Command) -> Result<&Sequence, PairingError> {
        let name = command.name();
        match command.execute(&self.staging, self.default_technique.as_deref()) {
            Ok(next) => {
                tracing::debug!("Applied {} ({} exercises)", name, next.len());
                self.staging = next;
                Ok(&self.staging)
            }
            Err(e) => {
                tracing::debug!("Rejected {}: {}", name, e);
                Err(e)
            }
        }
    }

    /// Publish the staging snapshot and return it for persistence
    pub fn commit(&mut self) -> Sequence {
        self.committed = self.staging.clone();
        tracing::debug!("Committed {} exercises", self.committed.len());
        self.committed.clone()
    }

    /// Drop uncommitted edits
    pub fn discard(&mut self) {
        if self.is_dirty() {
            tracing::debug!("Discarding uncommitted edits");
        }
        self.staging = self.committed.clone();
    }

    /// Swap temporary ids for the ids the persistence layer assigned
    pub fn reconcile_ids(&mut self, assigned: &HashMap<TempId, String>) {
        self.committed = self.committed.reconcile_ids(assigned);
        self.staging = self.staging.reconcile_ids(assigned);
    }
}

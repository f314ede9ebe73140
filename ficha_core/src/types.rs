//! Core domain types for workout plans.
//!
//! This module defines the fundamental types used throughout the system:
//! - Slot and group identifiers (temporary vs stored)
//! - Exercise slots and their pairing state
//! - Specs and patches used to create and edit slots
//! - The persisted plan record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Client-side id for a slot that has not been persisted yet
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TempId(Uuid);

impl TempId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmp:{}", self.0)
    }
}

/// Identifier of an exercise slot, stable for one editing session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotId {
    /// Minted locally, awaiting a stored id
    Temp(TempId),
    /// Assigned by the persistence collaborator
    Stored(String),
}

impl SlotId {
    pub fn is_temp(&self) -> bool {
        matches!(self, SlotId::Temp(_))
    }
}

impl From<TempId> for SlotId {
    fn from(id: TempId) -> Self {
        SlotId::Temp(id)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Temp(id) => id.fmt(f),
            SlotId::Stored(id) => f.write_str(id),
        }
    }
}

/// Identifier shared by the two members of a Bi-Set.
///
/// Always minted fresh; a dissolved group id is never handed out again.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Pairing
// ============================================================================

/// Position of a slot inside its pair
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairRole {
    /// Lower order; performed first, no rest afterwards
    First,
    /// Higher order; carries the pair's rest
    Second,
}

/// Pairing state of a slot
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pairing {
    #[default]
    None,
    Paired {
        #[serde(rename = "groupId")]
        group_id: GroupId,
        role: PairRole,
    },
}

impl Pairing {
    pub fn is_paired(&self) -> bool {
        matches!(self, Pairing::Paired { .. })
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Pairing::Paired { group_id, .. } => Some(*group_id),
            Pairing::None => None,
        }
    }

    pub fn role(&self) -> Option<PairRole> {
        match self {
            Pairing::Paired { role, .. } => Some(*role),
            Pairing::None => None,
        }
    }
}

// ============================================================================
// Exercise slots
// ============================================================================

/// One exercise occurrence within a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSlot {
    pub id: SlotId,
    pub name: String,
    pub muscle_group: String,
    pub order: u32,
    pub set_count: u32,
    pub rep_scheme: String,
    pub rest_seconds: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub video_ref: Option<String>,
    #[serde(default)]
    pub pairing: Pairing,
}

impl ExerciseSlot {
    /// Build a slot from a spec; `order` is assigned by the sequence
    pub fn from_spec(id: SlotId, spec: ExerciseSpec) -> Self {
        Self {
            id,
            name: spec.name,
            muscle_group: spec.muscle_group,
            order: 0,
            set_count: spec.set_count,
            rep_scheme: spec.rep_scheme,
            rest_seconds: spec.rest_seconds,
            notes: spec.notes,
            technique: spec.technique,
            video_ref: spec.video_ref,
            pairing: Pairing::None,
        }
    }
}

/// Fields needed to create a new slot
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSpec {
    pub name: String,
    pub muscle_group: String,
    pub rep_scheme: String,
    pub set_count: u32,
    pub rest_seconds: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub video_ref: Option<String>,
}

impl ExerciseSpec {
    /// Spec with 3 sets and 60 seconds of rest
    pub fn new(
        name: impl Into<String>,
        muscle_group: impl Into<String>,
        rep_scheme: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            muscle_group: muscle_group.into(),
            rep_scheme: rep_scheme.into(),
            set_count: 3,
            rest_seconds: 60,
            notes: None,
            technique: None,
            video_ref: None,
        }
    }

    pub fn with_sets(mut self, set_count: u32) -> Self {
        self.set_count = set_count;
        self
    }

    pub fn with_rest(mut self, rest_seconds: u32) -> Self {
        self.rest_seconds = rest_seconds;
        self
    }

    /// Check that name, muscle group and rep scheme are filled in
    pub fn check_required(&self) -> Result<(), crate::PairingError> {
        require("name", &self.name)?;
        require("muscleGroup", &self.muscle_group)?;
        require("repScheme", &self.rep_scheme)
    }

    /// Required fields plus a positive set count
    pub fn validate(&self) -> Result<(), crate::PairingError> {
        self.check_required()?;
        if self.set_count == 0 {
            return Err(crate::PairingError::InvalidSetCount(0));
        }
        Ok(())
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), crate::PairingError> {
    if value.trim().is_empty() {
        return Err(crate::PairingError::IncompleteExerciseSpec { field });
    }
    Ok(())
}

/// Partial update of a slot.
///
/// `None` leaves a field untouched. For the optional text fields,
/// `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub muscle_group: Option<String>,
    pub rep_scheme: Option<String>,
    pub set_count: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<Option<String>>,
    pub technique: Option<Option<String>>,
    pub video_ref: Option<Option<String>>,
}

impl ExercisePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Direction for block moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

// ============================================================================
// Plan
// ============================================================================

/// A workout plan (ficha) as exchanged with the persistence collaborator
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Stable identity; plan files written without one get a fresh id on load
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub student: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub exercises: Vec<ExerciseSlot>,
}

impl Plan {
    pub fn new(name: impl Into<String>, student: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            student,
            updated_at: Utc::now(),
            exercises: Vec::new(),
        }
    }
}

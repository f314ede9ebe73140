//! Error types for the ficha_core library.

use crate::{GroupId, SlotId};
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Validation failure of a single editing command.
///
/// These are local and never transient: the snapshot the command was
/// applied to is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    /// Both sides of a pair point at the same slot
    #[error("Cannot pair an exercise with itself ({0})")]
    InvalidPairSelection(SlotId),

    /// One of the selected slots already belongs to a pair
    #[error("Exercise {0} is already part of a Bi-Set")]
    AlreadyPaired(SlotId),

    /// A new exercise is missing one of its required fields
    #[error("Exercise is missing required field '{field}'")]
    IncompleteExerciseSpec { field: &'static str },

    /// No slot carries the group id
    #[error("Bi-Set group {0} not found")]
    GroupNotFound(GroupId),

    /// No slot has the id
    #[error("Exercise {0} not found")]
    SlotNotFound(SlotId),

    /// Set counts must be positive
    #[error("Set count must be at least 1 (got {0})")]
    InvalidSetCount(u32),

    /// A shared Bi-Set parameter was edited through a single member
    #[error("Field '{field}' is shared by the Bi-Set; edit the pair instead")]
    PairedFieldLocked { field: &'static str },
}

/// Core error type for ficha_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Editing command rejected
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// A stored exercise list breaks the sequence invariants
    #[error("Invalid plan: {}", .0.join("; "))]
    InvalidPlan(Vec<String>),

    /// No stored plan with this name
    #[error("Plan '{0}' not found")]
    PlanNotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#![forbid(unsafe_code)]

//! Core domain model and editing logic for Ficha workout plans.
//!
//! This crate provides:
//! - Domain types (exercise slots, pairing state, plans)
//! - Sequence store (ordering primitives)
//! - Pairing manager (Bi-Set groups and the deletion cascade)
//! - Editing sessions (copy-on-write staging, commit/discard)
//! - Plan file store, CSV export, configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod taxonomy;
pub mod sequence;
pub mod pairing;
pub mod session;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, PairingError, Result};
pub use types::*;
pub use config::Config;
pub use sequence::Sequence;
pub use pairing::{PairGroup, PairInput, BI_SET_TECHNIQUE};
pub use session::{Command, EditSession};
pub use store::{JsonFilePlanStore, PlanStore};
pub use taxonomy::{default_taxonomy, Taxonomy};

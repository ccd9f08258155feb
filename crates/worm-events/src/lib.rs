//! Shared measurement types for the worm arena simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine emits these outward to whatever records a run.

pub mod history;
pub mod record;

pub use history::{FieldSnapshot, WormHistory};
pub use record::{InvalidStateCode, StateCode, WormRecord};

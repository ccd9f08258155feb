//! ECS Components
//!
//! Grid geometry, the bacteria field resource and the worm component.

pub mod field;
pub mod grid;
pub mod worm;

pub use field::{BacteriaField, BacteriaParams, Boundary, DepositMode, GaussianPatch};
pub use grid::{Grid, TimeGrid};
pub use worm::{Deposition, MotionKind, MotionState, StateTick, Worm, WormId, WormParams};

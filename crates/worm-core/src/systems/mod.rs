//! ECS Systems
//!
//! One timestep runs the field update first, then steps every worm in
//! creation order.

pub mod field;
pub mod movement;

use bevy_ecs::prelude::*;

use crate::components::worm::WormParams;

pub use field::update_bacteria_field;
pub use movement::{step_worms, TickRecords};

/// Global simulation state resource
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationState {
    /// Index of the timestep being run
    pub current_step: u64,
    pub total_steps: u64,
}

/// Worm settings resource, shared read-only by every worm
#[derive(Resource, Debug, Clone, Copy)]
pub struct WormSettings(pub WormParams);

/// Build the per-timestep schedule.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((update_bacteria_field, step_worms).chain());
    schedule
}

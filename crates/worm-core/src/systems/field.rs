//! Field Update System

use bevy_ecs::prelude::*;

use crate::components::field::BacteriaField;

/// Advance the bacteria field by one reaction-diffusion step.
///
/// Runs once per timestep, before any worm moves.
pub fn update_bacteria_field(mut field: ResMut<BacteriaField>) {
    field.update();
}

//! Worm Foraging Simulation Library
//!
//! Run/tumble worms moving over a square arena while feeding a logistic
//! reaction-diffusion bacteria field.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use thiserror::Error;

pub mod components;
pub mod config;
pub mod output;
pub mod setup;
pub mod shutdown;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, SimConfig};
pub use output::{Keeper, OutputError, Recorder};
pub use simulation::{RunSummary, Simulation};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Anything that can end a run
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

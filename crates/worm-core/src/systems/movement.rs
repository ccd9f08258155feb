//! Worm Movement System
//!
//! Steps every worm once per timestep and collects their measurements.

use bevy_ecs::prelude::*;
use worm_events::WormRecord;

use crate::components::field::BacteriaField;
use crate::components::worm::Worm;
use crate::SimRng;

use super::{SimulationState, WormSettings};

/// Measurements produced during the current timestep, in stepping order
#[derive(Resource, Debug, Default)]
pub struct TickRecords {
    pub worms: Vec<WormRecord>,
    /// Drops made this timestep
    pub drops: u64,
}

impl TickRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: WormRecord) {
        self.worms.push(record);
    }

    pub fn drain(&mut self) -> Vec<WormRecord> {
        self.drops = 0;
        std::mem::take(&mut self.worms)
    }

    pub fn len(&self) -> usize {
        self.worms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worms.is_empty()
    }
}

/// Step each worm in id order against the shared field and RNG.
///
/// Worms run one after another, so a drop made by one worm is visible to
/// every worm stepped after it within the same timestep.
pub fn step_worms(
    state: Res<SimulationState>,
    settings: Res<WormSettings>,
    mut field: ResMut<BacteriaField>,
    mut rng: ResMut<SimRng>,
    mut tick_records: ResMut<TickRecords>,
    mut query: Query<&mut Worm>,
) {
    let mut worms: Vec<Mut<Worm>> = query.iter_mut().collect();
    worms.sort_by_key(|worm| worm.id);

    for mut worm in worms {
        if worm.step(&settings.0, &mut field, &mut rng.0) {
            tick_records.drops += 1;
        }
        tick_records.push(worm.record(state.current_step));
    }
}

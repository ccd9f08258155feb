//! Worm Spawning
//!
//! Places worms in the arena and spawns them as entities.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::debug;

use crate::components::grid::Grid;
use crate::components::worm::{Worm, WormId, WormParams};

use super::placement::generate_points_with_min_distance;

/// Starting coordinates for `count` worms, in real units.
///
/// A lone worm starts at the arena centre, which is the origin for a
/// symmetric arena. More worms are spread out with at least
/// `min_separation` grid cells between them.
pub fn starting_positions<R: Rng + ?Sized>(
    count: usize,
    grid: &Grid,
    min_separation: f64,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let dim = grid.size() as f64;
    generate_points_with_min_distance(count, (dim, dim), min_separation, rng)
        .into_iter()
        .map(|(col, row)| (grid.to_real(col), grid.to_real(row)))
        .collect()
}

/// Spawn `count` worms; ids follow creation order.
///
/// Draw order: placement first, then per worm its heading and first run
/// duration.
pub fn spawn_worms<R: Rng + ?Sized>(
    world: &mut World,
    count: u32,
    grid: &Grid,
    min_separation: f64,
    params: &WormParams,
    rng: &mut R,
) -> Vec<Entity> {
    let positions = starting_positions(count as usize, grid, min_separation, rng);

    positions
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let worm = Worm::spawn(WormId(i as u32), x, y, params, rng);
            debug!(id = i, x, y, angle = worm.angle, "spawned worm");
            world.spawn(worm).id()
        })
        .collect()
}

//! Starting Positions
//!
//! Spreads worms over the arena on a jittered lattice that keeps a minimum
//! distance between any two starting points. Works in grid-index space;
//! callers convert to real coordinates.

use rand::seq::SliceRandom;
use rand::Rng;

/// Generate `num_points` positions inside a `(rows, cols)` index-space arena.
///
/// Points sit on a regular interior lattice with at least `num_points`
/// nodes, each nudged by up to `(spacing - min_dist) / 2` per axis, so
/// neighbours stay at least `min_dist` apart whenever the lattice spacing
/// allows it. The lattice is shuffled before it is cut down to size.
///
/// A single point is always the arena centre and draws no randomness.
pub fn generate_points_with_min_distance<R: Rng + ?Sized>(
    num_points: usize,
    shape: (f64, f64),
    min_dist: f64,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let (rows, cols) = shape;
    if num_points == 0 {
        return Vec::new();
    }
    if num_points == 1 {
        return vec![(cols / 2.0, rows / 2.0)];
    }

    let width_ratio = cols / rows;
    let per_row = ((num_points as f64 * width_ratio).sqrt().ceil() as usize).clamp(1, num_points);
    let row_count = num_points.div_ceil(per_row);

    let spacing_x = cols / (per_row + 1) as f64;
    let spacing_y = rows / (row_count + 1) as f64;
    let max_movement = ((spacing_x.min(spacing_y) - min_dist) / 2.0).max(0.0);

    let mut points: Vec<(f64, f64)> = (1..=row_count)
        .flat_map(|j| (1..=per_row).map(move |i| (i as f64 * spacing_x, j as f64 * spacing_y)))
        .collect();

    if max_movement > 0.0 {
        for (x, y) in &mut points {
            *x += rng.gen_range(-max_movement..max_movement);
            *y += rng.gen_range(-max_movement..max_movement);
        }
    }

    points.shuffle(rng);
    points.truncate(num_points);
    points
}

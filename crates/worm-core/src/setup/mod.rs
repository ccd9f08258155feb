//! World Setup
//!
//! Starting positions and worm spawning.

pub mod placement;
pub mod worms;

pub use placement::generate_points_with_min_distance;
pub use worms::{spawn_worms, starting_positions};

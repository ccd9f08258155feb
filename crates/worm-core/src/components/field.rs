//! Bacteria Field
//!
//! The concentration grid and its reaction-diffusion update. Values are
//! kept in `[0, 1]` at all times; 1 is the carrying capacity.
//!
//! Each timestep advances `∂b/∂t = ∇²b + b(1 - b)` by one explicit Euler
//! step, using a 9-point Laplacian (cardinal weight 1, diagonal weight 0.5,
//! centre weight -6, divided by dx²).

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use worm_events::FieldSnapshot;

use crate::config::{ConfigError, DepositKind, SimConfig};

use super::grid::Grid;

/// Neighbour offsets and stencil weights, as `(d_row, d_col, weight)`.
const STENCIL: [(isize, isize, f64); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, 0.5),
    (-1, -1, 0.5),
    (1, -1, 0.5),
    (-1, 1, 0.5),
];
const CENTRE_WEIGHT: f64 = -6.0;

/// Gaussian support is cut off at this many radii.
const PATCH_CUTOFF: f64 = 3.0;

/// What happens to the outermost ring of cells during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Edge cells are never updated and keep their previous value
    #[default]
    Frozen,
    /// Every cell is updated; neighbours past the edge mirror back inside
    Mirror,
    /// Every cell is updated; neighbours wrap to the opposite edge
    Periodic,
}

/// A radially symmetric Gaussian bump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPatch {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub amplitude: f64,
}

/// How a deposit spreads into the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepositMode {
    /// Add to the single nearest cell
    Point,
    /// Add a Gaussian patch of the given radius
    Patch { radius: f64 },
}

/// Field settings taken from the run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BacteriaParams {
    pub boundary: Boundary,
    pub deposit: DepositMode,
    /// Initial seeding, if any
    pub seed: Option<GaussianPatch>,
}

impl BacteriaParams {
    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        let deposit = match config.bacteria_deposit_mode {
            DepositKind::Point => DepositMode::Point,
            DepositKind::Patch => {
                if !(config.bacteria_deposit_radius.is_finite()
                    && config.bacteria_deposit_radius > 0.0)
                {
                    return Err(ConfigError::invalid(
                        "bacteria_deposit_radius",
                        "must be positive for patch deposits",
                    ));
                }
                DepositMode::Patch {
                    radius: config.bacteria_deposit_radius,
                }
            }
        };

        let seed = if config.bacteria_seed_patch {
            if !(config.bacteria_seed_radius.is_finite() && config.bacteria_seed_radius > 0.0) {
                return Err(ConfigError::invalid(
                    "bacteria_seed_radius",
                    "must be positive when seeding",
                ));
            }
            let centre_ok = config.bacteria_seed_x.is_finite()
                && config.bacteria_seed_y.is_finite()
                && config.bacteria_seed_amplitude.is_finite();
            if !centre_ok {
                return Err(ConfigError::invalid(
                    "bacteria_seed_patch",
                    "centre and amplitude must be finite",
                ));
            }
            Some(GaussianPatch {
                x: config.bacteria_seed_x,
                y: config.bacteria_seed_y,
                radius: config.bacteria_seed_radius,
                amplitude: config.bacteria_seed_amplitude,
            })
        } else {
            None
        };

        Ok(Self {
            boundary: config.bacteria_boundary,
            deposit,
            seed,
        })
    }
}

impl Default for BacteriaParams {
    fn default() -> Self {
        Self {
            boundary: Boundary::Frozen,
            deposit: DepositMode::Point,
            seed: None,
        }
    }
}

/// Resource: the bacteria concentration grid.
///
/// Row-major, rows along y and columns along x, matching [`Grid::coordinate`].
#[derive(Resource, Debug, Clone)]
pub struct BacteriaField {
    grid: Grid,
    dt: f64,
    boundary: Boundary,
    deposit: DepositMode,
    cells: Vec<f64>,
    /// Previous-step values, reused across updates
    previous: Vec<f64>,
}

impl BacteriaField {
    /// Allocate an all-zero field, then apply the optional seed patch.
    pub fn new(grid: Grid, dt: f64, params: &BacteriaParams) -> Self {
        let mut field = Self {
            grid,
            dt,
            boundary: params.boundary,
            deposit: params.deposit,
            cells: vec![0.0; grid.cell_count()],
            previous: vec![0.0; grid.cell_count()],
        };
        if let Some(seed) = params.seed {
            field.initialize_patch(seed.x, seed.y, seed.radius, seed.amplitude);
        }
        field
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn deposit_mode(&self) -> DepositMode {
        self.deposit
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.grid.size();
        if row >= n || col >= n {
            return None;
        }
        Some(self.cells[row * n + col])
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.total() / self.cells.len() as f64
    }

    pub fn snapshot(&self, t: u64) -> FieldSnapshot {
        FieldSnapshot::new(t, self.grid.size(), self.cells.clone())
    }

    /// Add a Gaussian bump to every cell within three radii of the centre,
    /// then clamp the whole field to `[0, 1]`.
    pub fn initialize_patch(&mut self, x_center: f64, y_center: f64, radius: f64, amplitude: f64) {
        let n = self.grid.size();
        if radius > 0.0 {
            let two_r2 = 2.0 * radius * radius;
            let cutoff = PATCH_CUTOFF * radius;
            for row in 0..n {
                for col in 0..n {
                    let (x, y) = self.grid.coordinate(row, col);
                    let dist_sq = (x - x_center).powi(2) + (y - y_center).powi(2);
                    if dist_sq.sqrt() < cutoff {
                        self.cells[row * n + col] += amplitude * (-dist_sq / two_r2).exp();
                    }
                }
            }
        }
        self.clamp();
    }

    /// Add `amount` at a real coordinate. Returns false when the point maps
    /// outside the grid, in which case nothing changes.
    pub fn deposit_at(&mut self, x: f64, y: f64, amount: f64) -> bool {
        match self.deposit {
            DepositMode::Point => {
                let (Some(col), Some(row)) = (self.grid.nearest_cell(x), self.grid.nearest_cell(y))
                else {
                    return false;
                };
                let n = self.grid.size();
                let cell = &mut self.cells[row * n + col];
                *cell = (*cell + amount).clamp(0.0, 1.0);
                true
            }
            DepositMode::Patch { radius } => {
                if self.grid.nearest_cell(x).is_none() || self.grid.nearest_cell(y).is_none() {
                    return false;
                }
                self.initialize_patch(x, y, radius, amount);
                true
            }
        }
    }

    /// Advance the field by one timestep, then clamp to `[0, 1]`.
    pub fn update(&mut self) {
        let n = self.grid.size();
        let inv_dx2 = 1.0 / (self.grid.dx * self.grid.dx);
        self.previous.copy_from_slice(&self.cells);

        let range = match self.boundary {
            Boundary::Frozen => 1..n.saturating_sub(1),
            Boundary::Mirror | Boundary::Periodic => 0..n,
        };

        for row in range.clone() {
            for col in range.clone() {
                let b = self.previous[row * n + col];
                let diffusion = self.laplacian(row, col) * inv_dx2;
                let growth = b * (1.0 - b);
                self.cells[row * n + col] = (b + self.dt * (diffusion + growth)).clamp(0.0, 1.0);
            }
        }
    }

    /// Undivided 9-point Laplacian of the previous-step values.
    fn laplacian(&self, row: usize, col: usize) -> f64 {
        let n = self.grid.size();
        let centre = self.previous[row * n + col];
        STENCIL
            .iter()
            .map(|&(dr, dc, weight)| {
                let r = self.neighbour(row as isize + dr);
                let c = self.neighbour(col as isize + dc);
                weight * self.previous[r * n + c]
            })
            .sum::<f64>()
            + CENTRE_WEIGHT * centre
    }

    /// Map a possibly out-of-range axis index back onto the grid.
    fn neighbour(&self, index: isize) -> usize {
        let n = self.grid.size() as isize;
        let mapped = match self.boundary {
            Boundary::Periodic => index.rem_euclid(n),
            // Frozen only visits interior cells, so this never leaves the grid
            Boundary::Frozen | Boundary::Mirror => {
                let reflected = if index < 0 {
                    -index
                } else if index >= n {
                    2 * (n - 1) - index
                } else {
                    index
                };
                reflected.clamp(0, n - 1)
            }
        };
        mapped as usize
    }

    fn clamp(&mut self) {
        for cell in &mut self.cells {
            *cell = cell.clamp(0.0, 1.0);
        }
    }
}

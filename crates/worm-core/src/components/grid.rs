//! Grid Components
//!
//! Spatial discretization of the square arena and the time grid that
//! drives the loop. Both axes share `x_min`, `x_max` and `dx`.

use crate::config::ConfigError;

/// Absorbs representation error in `(max - min) / step` before flooring,
/// so that e.g. 3.0 / 0.01 counts 300 intervals rather than 299.
const FLOOR_TOLERANCE: f64 = 1e-9;

/// Largest supported field, in cells (N² for an N×N grid).
pub const MAX_GRID_CELLS: usize = 1 << 26;

fn interval_count(span: f64, step: f64) -> u64 {
    (span / step + FLOOR_TOLERANCE).floor() as u64
}

/// The N×N spatial lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub x_min: f64,
    pub x_max: f64,
    pub dx: f64,
    size: usize,
}

impl Grid {
    /// `N = floor((x_max - x_min) / dx) + 1` points per axis.
    pub fn new(x_min: f64, x_max: f64, dx: f64) -> Result<Self, ConfigError> {
        if !(x_min.is_finite() && x_max.is_finite() && dx.is_finite()) {
            return Err(ConfigError::InvalidGrid(
                "bounds and spacing must be finite".to_string(),
            ));
        }
        if dx <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "dx must be positive, got {dx}"
            )));
        }
        if x_max <= x_min {
            return Err(ConfigError::InvalidGrid(format!(
                "x_max ({x_max}) must be greater than x_min ({x_min})"
            )));
        }

        let intervals = (x_max - x_min) / dx;
        let max_size = (MAX_GRID_CELLS as f64).sqrt();
        if intervals + 1.0 > max_size {
            return Err(ConfigError::InvalidGrid(format!(
                "{intervals:.0} intervals per axis exceed the {MAX_GRID_CELLS}-cell limit"
            )));
        }
        let size = interval_count(x_max - x_min, dx) as usize + 1;
        Ok(Self {
            x_min,
            x_max,
            dx,
            size,
        })
    }

    /// Number of points per axis.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn extent(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// 1-D coordinate lattice, shared by both axes.
    pub fn axis(&self) -> Vec<f64> {
        (0..self.size)
            .map(|i| self.x_min + i as f64 * self.dx)
            .collect()
    }

    /// Real coordinates of the cell at `(row, col)`; rows follow y.
    pub fn coordinate(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.x_min + col as f64 * self.dx,
            self.x_min + row as f64 * self.dx,
        )
    }

    /// 2-D lattice as `(x, y)` pairs in row-major order.
    pub fn lattice(&self) -> Vec<(f64, f64)> {
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (row, col)))
            .map(|(row, col)| self.coordinate(row, col))
            .collect()
    }

    /// Real coordinate to fractional grid index, scaled to `[0, N]`.
    pub fn to_index(&self, real: f64) -> f64 {
        (real - self.x_min) / self.extent() * self.size as f64
    }

    /// Fractional grid index in `[0, N]` back to a real coordinate.
    pub fn to_real(&self, index: f64) -> f64 {
        self.x_min + index / self.size as f64 * self.extent()
    }

    /// Index of the lattice point nearest to `real`, if it lies on the grid.
    pub fn nearest_cell(&self, real: f64) -> Option<usize> {
        let index = ((real - self.x_min) / self.dx).round();
        if index.is_finite() && index >= 0.0 && (index as usize) < self.size {
            Some(index as usize)
        } else {
            None
        }
    }

    /// True when `real` lies strictly inside `(x_min, x_max)`.
    pub fn contains(&self, real: f64) -> bool {
        self.x_min < real && real < self.x_max
    }
}

/// Ordered, finite sequence of timesteps `0 .. T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    pub t_min: f64,
    pub t_max: f64,
    pub dt: f64,
    steps: u64,
}

impl TimeGrid {
    /// `T = floor((t_max - t_min) / dt)` steps.
    pub fn new(t_min: f64, t_max: f64, dt: f64) -> Result<Self, ConfigError> {
        if !(t_min.is_finite() && t_max.is_finite() && dt.is_finite()) {
            return Err(ConfigError::InvalidTimeGrid(
                "bounds and step must be finite".to_string(),
            ));
        }
        if dt <= 0.0 {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "dt must be positive, got {dt}"
            )));
        }
        if t_max < t_min {
            return Err(ConfigError::InvalidTimeGrid(format!(
                "t_max ({t_max}) must not precede t_min ({t_min})"
            )));
        }

        Ok(Self {
            t_min,
            t_max,
            dt,
            steps: interval_count(t_max - t_min, dt),
        })
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time at step `index`.
    pub fn time_at(&self, index: u64) -> f64 {
        self.t_min + index as f64 * self.dt
    }

    pub fn indices(&self) -> std::ops::Range<u64> {
        0..self.steps
    }
}

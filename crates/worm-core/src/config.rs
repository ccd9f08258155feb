//! Configuration System
//!
//! A run is described by one flat table of parameters, loaded from TOML.
//! Every key has a default, so a config file only needs the keys it changes.
//! [`SimConfig::validate`] turns the raw table into the typed, read-only
//! settings that the components are built from.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::field::{BacteriaParams, Boundary};
use crate::components::grid::{Grid, TimeGrid};
use crate::components::worm::WormParams;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "worm_sim.toml";

/// How worms add bacteria to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositKind {
    /// Add the amount to the single nearest grid cell
    #[default]
    Point,
    /// Add a small Gaussian patch centred on the worm
    Patch,
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Log progress for every timestep
    pub verbose: bool,
    pub random_seed: u64,
    /// When false, nothing is recorded or written
    pub measurements_on: bool,
    /// Parent directory for experiment output
    pub base_dir: PathBuf,

    pub x_min: f64,
    pub x_max: f64,
    pub dx: f64,
    pub t_min: f64,
    pub t_max: f64,
    pub dt: f64,

    pub num_worms: u32,
    pub worm_step_size: f64,
    /// Standard deviation of the heading noise while running
    pub worm_turn_noise: f64,
    /// Mean run duration, in timesteps
    pub worm_mean_run_duration: f64,
    /// Mean tumble duration, in timesteps
    pub worm_mean_tumble_duration: f64,
    /// False selects constant running with no tumbles
    pub worm_run_tumble: bool,
    /// Minimum distance between starting positions, in grid cells
    pub worm_min_separation: f64,

    pub bacteria_enabled: bool,
    /// Worm timesteps between two drops
    pub bacteria_drop_interval: u64,
    pub bacteria_amount: f64,
    pub bacteria_deposit_mode: DepositKind,
    pub bacteria_deposit_radius: f64,
    pub bacteria_boundary: Boundary,
    /// Seed the field with a Gaussian patch at startup
    pub bacteria_seed_patch: bool,
    pub bacteria_seed_x: f64,
    pub bacteria_seed_y: f64,
    pub bacteria_seed_radius: f64,
    pub bacteria_seed_amplitude: f64,

    /// Timesteps between stored field snapshots; 0 disables them
    pub field_snapshot_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            random_seed: 42,
            measurements_on: true,
            base_dir: PathBuf::from("experiments"),
            x_min: -1.5,
            x_max: 1.5,
            dx: 0.01,
            t_min: 0.0,
            t_max: 0.125,
            dt: 0.005,
            num_worms: 1,
            worm_step_size: 0.1,
            worm_turn_noise: 0.2,
            worm_mean_run_duration: 3.0,
            worm_mean_tumble_duration: 2.0,
            worm_run_tumble: true,
            worm_min_separation: 10.0,
            bacteria_enabled: false,
            bacteria_drop_interval: 5,
            bacteria_amount: 1.0,
            bacteria_deposit_mode: DepositKind::Point,
            bacteria_deposit_radius: 0.03,
            bacteria_boundary: Boundary::Frozen,
            bacteria_seed_patch: true,
            bacteria_seed_x: 0.0,
            bacteria_seed_y: 0.0,
            bacteria_seed_radius: 0.1,
            bacteria_seed_amplitude: 1.0,
            field_snapshot_interval: 0,
        }
    }
}

/// Validated settings, split per component.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub grid: Grid,
    pub time: TimeGrid,
    pub worm: WormParams,
    pub bacteria: BacteriaParams,
    pub num_worms: u32,
    pub min_separation: f64,
    pub random_seed: u64,
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every parameter and build the per-component settings.
    ///
    /// An unusable grid or time grid is rejected here, before anything
    /// is allocated.
    pub fn validate(&self) -> Result<RunSettings, ConfigError> {
        let grid = Grid::new(self.x_min, self.x_max, self.dx)?;
        let time = TimeGrid::new(self.t_min, self.t_max, self.dt)?;
        let worm = WormParams::from_config(self)?;
        let bacteria = BacteriaParams::from_config(self)?;

        if !self.worm_min_separation.is_finite() || self.worm_min_separation < 0.0 {
            return Err(ConfigError::invalid(
                "worm_min_separation",
                "must be a non-negative number",
            ));
        }

        Ok(RunSettings {
            grid,
            time,
            worm,
            bacteria,
            num_worms: self.num_worms,
            min_separation: self.worm_min_separation,
            random_seed: self.random_seed,
        })
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

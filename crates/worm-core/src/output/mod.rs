//! Output Generation
//!
//! Measurement recording and the on-disk experiment layout.

pub mod experiment;
pub mod keeper;

use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::config::SimConfig;

pub use experiment::{experiment_dir, prepare_experiment_dir};
pub use keeper::{Keeper, Recorder, FIELD_HISTORY_FILE, WORM_HISTORY_FILE};

/// Output error type
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not serialize config: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Keeper for a run of `config`.
///
/// With measurements on, the experiment directory is prepared and the
/// keeper writes into it. With measurements off, nothing is created and
/// the keeper sleeps.
pub fn open_keeper(config: &SimConfig, source: Option<&Path>) -> Result<Keeper, OutputError> {
    if !config.measurements_on {
        info!("Measurements off, nothing will be written");
        return Ok(Keeper::sleeping());
    }
    let dir = prepare_experiment_dir(config, source)?;
    Ok(Keeper::new(dir, config.field_snapshot_interval))
}

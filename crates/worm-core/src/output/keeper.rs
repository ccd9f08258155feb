//! Measurement Keeper
//!
//! Collects worm measurements and field snapshots for a run and writes
//! them to the experiment directory once, when the run ends.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use worm_events::{FieldSnapshot, WormHistory, WormRecord};

use crate::components::field::BacteriaField;

use super::OutputError;

/// Worm history file name inside the experiment directory
pub const WORM_HISTORY_FILE: &str = "worm_hist.json";
/// Field snapshot file name inside the experiment directory
pub const FIELD_HISTORY_FILE: &str = "envir_hist.jsonl";

/// Receives everything the loop measures.
///
/// `record_worm` is called once per worm per timestep, in stepping order;
/// `record_field` once per timestep after all worms have moved; `flush`
/// once when the run ends, however it ends.
pub trait Recorder {
    fn record_worm(&mut self, record: &WormRecord);

    fn record_field(&mut self, t: u64, field: &BacteriaField);

    fn flush(&mut self) -> Result<(), OutputError>;
}

/// Default [`Recorder`]: keeps a columnar history in memory and persists it
/// on flush.
#[derive(Debug)]
pub struct Keeper {
    history: WormHistory,
    field_snapshots: Vec<FieldSnapshot>,
    /// Timesteps between field snapshots; 0 disables them
    snapshot_interval: u64,
    /// Where to write on flush; `None` keeps data in memory only
    output_dir: Option<PathBuf>,
    sleeping: bool,
    flushed: bool,
}

impl Keeper {
    /// Keeper writing into `output_dir` on flush
    pub fn new(output_dir: impl AsRef<Path>, snapshot_interval: u64) -> Self {
        let mut keeper = Self::in_memory(snapshot_interval);
        keeper.output_dir = Some(output_dir.as_ref().to_path_buf());
        keeper
    }

    /// Keeper that records but never touches the filesystem (for testing)
    pub fn in_memory(snapshot_interval: u64) -> Self {
        Self {
            history: WormHistory::new(),
            field_snapshots: Vec::new(),
            snapshot_interval,
            output_dir: None,
            sleeping: false,
            flushed: false,
        }
    }

    /// Keeper that ignores every measurement
    pub fn sleeping() -> Self {
        let mut keeper = Self::in_memory(0);
        keeper.sleeping = true;
        keeper
    }

    pub fn history(&self) -> &WormHistory {
        &self.history
    }

    pub fn field_snapshots(&self) -> &[FieldSnapshot] {
        &self.field_snapshots
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    fn write_worm_history(&self, dir: &Path) -> Result<(), OutputError> {
        let path = dir.join(WORM_HISTORY_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &self.history)?;
        writer.flush()?;
        info!("Wrote {} worm records to {}", self.history.len(), path.display());
        Ok(())
    }

    fn write_field_history(&self, dir: &Path) -> Result<(), OutputError> {
        if self.field_snapshots.is_empty() {
            return Ok(());
        }
        let path = dir.join(FIELD_HISTORY_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        for snapshot in &self.field_snapshots {
            let json = serde_json::to_string(snapshot)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        info!(
            "Wrote {} field snapshots to {}",
            self.field_snapshots.len(),
            path.display()
        );
        Ok(())
    }
}

impl Recorder for Keeper {
    fn record_worm(&mut self, record: &WormRecord) {
        if self.sleeping {
            return;
        }
        self.history.push(record);
    }

    fn record_field(&mut self, t: u64, field: &BacteriaField) {
        if self.sleeping || self.snapshot_interval == 0 {
            return;
        }
        if t % self.snapshot_interval == 0 {
            self.field_snapshots.push(field.snapshot(t));
        }
    }

    /// Persist everything recorded so far. Only the first call writes.
    fn flush(&mut self) -> Result<(), OutputError> {
        if self.flushed {
            debug!("Keeper already flushed, skipping");
            return Ok(());
        }
        self.flushed = true;
        if self.sleeping {
            return Ok(());
        }
        let Some(dir) = self.output_dir.clone() else {
            return Ok(());
        };
        self.write_worm_history(&dir)?;
        self.write_field_history(&dir)?;
        Ok(())
    }
}

impl Drop for Keeper {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("Failed to flush keeper: {}", e);
        }
    }
}

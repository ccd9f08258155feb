//! History Types
//!
//! Accumulated measurements for a whole run. Worm measurements are stored
//! column-wise, one array per measured quantity, which is also the layout
//! written to disk.

use serde::{Deserialize, Serialize};

use crate::record::{StateCode, WormRecord};

/// Column-oriented worm measurements.
///
/// Every column always has the same length; row `i` across all columns is
/// one [`WormRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WormHistory {
    pub t: Vec<u64>,
    pub worm_i: Vec<u32>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub state: Vec<StateCode>,
    pub angle: Vec<f64>,
    pub timestep: Vec<u64>,
}

impl WormHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measurement as a new row.
    pub fn push(&mut self, record: &WormRecord) {
        self.t.push(record.t);
        self.worm_i.push(record.worm_i);
        self.x.push(record.x);
        self.y.push(record.y);
        self.state.push(record.state);
        self.angle.push(record.angle);
        self.timestep.push(record.timestep);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Reassemble row `index`.
    pub fn get(&self, index: usize) -> Option<WormRecord> {
        if index >= self.len() {
            return None;
        }
        Some(WormRecord {
            t: self.t[index],
            worm_i: self.worm_i[index],
            x: self.x[index],
            y: self.y[index],
            state: self.state[index],
            angle: self.angle[index],
            timestep: self.timestep[index],
        })
    }

    /// Iterate rows in recording order.
    pub fn records(&self) -> impl Iterator<Item = WormRecord> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// All rows belonging to one worm, in recording order.
    pub fn for_worm(&self, worm_i: u32) -> Vec<WormRecord> {
        self.records().filter(|r| r.worm_i == worm_i).collect()
    }
}

/// A recorded copy of the concentration grid.
///
/// `concentration` is row-major with `size * size` entries; rows follow
/// the y axis and columns the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub t: u64,
    pub size: usize,
    pub concentration: Vec<f64>,
}

impl FieldSnapshot {
    pub fn new(t: u64, size: usize, concentration: Vec<f64>) -> Self {
        Self {
            t,
            size,
            concentration,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.concentration.get(row * self.size + col).copied()
    }

    /// Mean concentration over the whole grid.
    pub fn mean(&self) -> f64 {
        if self.concentration.is_empty() {
            return 0.0;
        }
        self.concentration.iter().sum::<f64>() / self.concentration.len() as f64
    }
}

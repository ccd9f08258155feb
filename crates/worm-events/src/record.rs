//! Worm Records
//!
//! One measurement of one worm at one timestep.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric encoding of a worm's motion state.
///
/// Serializes as a bare integer: `run` is 0, `tumble` is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StateCode {
    Run,
    Tumble,
}

impl StateCode {
    pub fn code(self) -> u8 {
        match self {
            StateCode::Run => 0,
            StateCode::Tumble => 1,
        }
    }
}

impl From<StateCode> for u8 {
    fn from(state: StateCode) -> Self {
        state.code()
    }
}

/// Error for integers that do not name a motion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStateCode(pub u8);

impl fmt::Display for InvalidStateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid state code: {}", self.0)
    }
}

impl std::error::Error for InvalidStateCode {}

impl TryFrom<u8> for StateCode {
    type Error = InvalidStateCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StateCode::Run),
            1 => Ok(StateCode::Tumble),
            other => Err(InvalidStateCode(other)),
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateCode::Run => write!(f, "run"),
            StateCode::Tumble => write!(f, "tumble"),
        }
    }
}

/// A single worm measurement, taken right after the worm stepped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WormRecord {
    /// Global timestep index of the loop
    pub t: u64,
    /// Worm identifier (creation order)
    pub worm_i: u32,
    pub x: f64,
    pub y: f64,
    pub state: StateCode,
    /// Heading in radians, within [0, 2π)
    pub angle: f64,
    /// The worm's own step counter after this step
    pub timestep: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code_values() {
        assert_eq!(StateCode::Run.code(), 0);
        assert_eq!(StateCode::Tumble.code(), 1);
        assert_eq!(StateCode::try_from(1), Ok(StateCode::Tumble));
        assert_eq!(StateCode::try_from(7), Err(InvalidStateCode(7)));
    }

    #[test]
    fn test_state_code_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&StateCode::Run).unwrap(), "0");
        assert_eq!(serde_json::to_string(&StateCode::Tumble).unwrap(), "1");
        assert!(serde_json::from_str::<StateCode>("2").is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let record = WormRecord {
            t: 3,
            worm_i: 0,
            x: 0.1,
            y: -0.2,
            state: StateCode::Tumble,
            angle: 1.5,
            timestep: 4,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["state"], 1);
        assert_eq!(value["worm_i"], 0);
        assert_eq!(value["timestep"], 4);
    }
}

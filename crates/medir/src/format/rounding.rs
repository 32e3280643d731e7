//! Decimal rounding with three modes.

use crate::result::MedirError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rounding mode at a given decimal precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// Standard round-half-away-from-zero
    #[default]
    Std,
    /// Ceiling at the given precision
    Up,
    /// Floor at the given precision
    Down,
}

impl FromStr for RoundMode {
    type Err = MedirError;

    /// Any string outside `std`/`up`/`down` is a configuration error and
    /// aborts the run.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "std" => Ok(Self::Std),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(MedirError::UnsupportedRoundMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Round `value` at `precision` decimal digits using `mode`.
#[must_use]
pub fn round(value: f64, precision: u32, mode: RoundMode) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let rounded = match mode {
        RoundMode::Std => scaled.round(),
        RoundMode::Up => scaled.ceil(),
        RoundMode::Down => scaled.floor(),
    };
    rounded / factor
}

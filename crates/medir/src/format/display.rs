//! Display-value rounding for assertion messages.
//!
//! The reported actual value is rounded in the direction that cannot make a
//! failing comparison look passing (or vice versa): "must not exceed" signs
//! round up, "must not fall below" signs round down. When the naive rounding
//! lands exactly on the expected value the opposite direction is used so the
//! message never shows a misleading equality. Pass/fail is always computed on
//! raw values elsewhere; this module affects display only.

use crate::assertion::{Expected, Sign};
use crate::format::duration::format_iso8601_ms;
use crate::format::rounding::{round, RoundMode};

/// Format the actual value of an assertion for its human-readable message.
///
/// Duration expectations render as ISO-8601 at integer-millisecond precision;
/// numeric expectations render at one decimal.
#[must_use]
pub fn format_actual(actual: f64, expected: &Expected, sign: Sign) -> String {
    let (precision, expected_value) = match expected {
        Expected::Duration { ms, .. } => (0, *ms),
        Expected::Number(n) => (1, *n),
    };

    let rounded = match sign {
        Sign::Lte | Sign::Gt => directed(actual, precision, expected_value, RoundMode::Up),
        Sign::Gte | Sign::Lt => directed(actual, precision, expected_value, RoundMode::Down),
        Sign::Eql | Sign::Deql => round(actual, precision, RoundMode::Std),
    };

    match expected {
        Expected::Duration { .. } => format_iso8601_ms(rounded),
        Expected::Number(_) => format!("{rounded}"),
    }
}

/// Round in the preferred direction, falling back to the opposite direction
/// when the result collides with the expected value.
fn directed(actual: f64, precision: u32, expected_value: f64, preferred: RoundMode) -> f64 {
    let candidate = round(actual, precision, preferred);
    if (candidate - expected_value).abs() < f64::EPSILON && (actual - expected_value).abs() > f64::EPSILON {
        let opposite = match preferred {
            RoundMode::Up => RoundMode::Down,
            RoundMode::Down => RoundMode::Up,
            RoundMode::Std => RoundMode::Std,
        };
        return round(actual, precision, opposite);
    }
    candidate
}

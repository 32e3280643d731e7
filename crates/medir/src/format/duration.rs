//! ISO-8601 duration handling.
//!
//! Profiles express time thresholds either as plain millisecond numbers or as
//! ISO-8601 duration strings. The two are distinguished by the `PT` prefix
//! convention only; full ISO-8601 validation happens at parse time.

use crate::result::{MedirError, MedirResult};
use regex::Regex;

/// True iff the value's string form starts with the `PT` duration designator.
///
/// This is a prefix check only, mirroring how profile values are routed. A
/// value that passes this check may still fail `parse_iso8601_ms`.
#[must_use]
pub fn is_iso8601(value: &str) -> bool {
    value.trim().starts_with("PT")
}

/// Parse a `PT[nH][nM][n.nS]` duration into milliseconds.
pub fn parse_iso8601_ms(input: &str) -> MedirResult<f64> {
    let re = Regex::new(r"^PT(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?$")
        .unwrap();
    let trimmed = input.trim();
    let caps = re.captures(trimmed).ok_or_else(|| MedirError::InvalidDuration {
        input: input.to_string(),
    })?;
    if caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() {
        // "PT" alone designates nothing
        return Err(MedirError::InvalidDuration {
            input: input.to_string(),
        });
    }
    let part = |i: usize| -> f64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    let seconds = part(1) * 3600.0 + part(2) * 60.0 + part(3);
    Ok(seconds * 1000.0)
}

/// Serialize a millisecond value back into `PT[nH][nM][n.nS]` form.
#[must_use]
pub fn format_iso8601_ms(ms: f64) -> String {
    let total_secs = ms.abs() / 1000.0;
    let hours = (total_secs / 3600.0).floor();
    let minutes = ((total_secs - hours * 3600.0) / 60.0).floor();
    let seconds = total_secs - hours * 3600.0 - minutes * 60.0;

    let mut out = String::from("PT");
    if hours > 0.0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0.0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0.0 || (hours == 0.0 && minutes == 0.0) {
        out.push_str(&format!("{}S", trim_decimal(seconds)));
    }
    out
}

/// Render a float without trailing zero noise (max 3 decimals).
fn trim_decimal(value: f64) -> String {
    let formatted = format!("{value:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

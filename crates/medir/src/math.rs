//! Numeric helpers shared by aggregation and lag analysis.

use crate::format::color::Rgb;

/// Arithmetic mean of a slice. Empty input yields `0.0`.
#[must_use]
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coerce a JSON value to `f64`.
///
/// Log payloads carry numeric fields both as JSON numbers and as numeric
/// strings, depending on the emitting browser.
#[must_use]
pub fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Partition a slice into fixed-size windows; the last window may be short.
///
/// A zero `size` yields a single window holding everything.
#[must_use]
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return vec![items.to_vec()];
    }
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Euclidean distance between two RGB colors.
#[must_use]
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r - b.r;
    let dg = a.g - b.g;
    let db = a.b - b.b;
    dr.mul_add(dr, dg.mul_add(dg, db * db)).sqrt()
}

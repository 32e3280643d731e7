//! Inter-stream synchronization offsets.
//!
//! Matches each video observation to the nearest observation of another
//! stream (audio, or a second subscriber in the two-viewer case) within a
//! bounded search window and aggregates the absolute offsets.

use crate::math::average;
use serde::Serialize;

/// Maximum distance, in milliseconds, at which two observations still pair.
pub const SYNC_SEARCH_WINDOW_MS: f64 = 1000.0;

/// Outcome of one sync analysis pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Absolute offsets of matched pairs, video order
    pub offsets: Vec<f64>,
    /// Mean offset, 0 when nothing matched
    pub average: f64,
    /// Maximum offset
    pub max: f64,
    /// Video observations with no counterpart inside the window
    pub unmatched: usize,
}

/// Compute sync offsets between video observations and another stream's
/// observations.
#[must_use]
pub fn analyze_sync(video_timestamps: &[f64], other_timestamps: &[f64]) -> SyncReport {
    let mut offsets = Vec::new();
    let mut unmatched = 0_usize;

    for &video_ts in video_timestamps {
        let nearest = other_timestamps
            .iter()
            .map(|&other_ts| (other_ts - video_ts).abs())
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        match nearest {
            Some(offset) if offset <= SYNC_SEARCH_WINDOW_MS => offsets.push(offset),
            _ => unmatched += 1,
        }
    }

    let average = average(&offsets);
    let max = offsets.iter().copied().fold(0.0, f64::max);
    SyncReport {
        offsets,
        average,
        max,
        unmatched,
    }
}

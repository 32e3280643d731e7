//! Lag and sync analysis.
//!
//! Correlates publisher-side signal emissions with subscriber-side
//! observations to compute per-event lag, and matches video observations to
//! audio (or second-subscriber) observations to compute sync offsets.

pub mod analyzer;
pub mod sync;

pub use analyzer::{
    analyze_audio_lag, analyze_audio_rtmp_lag, analyze_video_lag, analyze_video_rtmp_lag,
    CorrelatedSample, LagReport, COLOR_MATCH_TOLERANCE, RTMP_MARKER_MIN_FREQUENCY,
};
pub use sync::{analyze_sync, SyncReport, SYNC_SEARCH_WINDOW_MS};

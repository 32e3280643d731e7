//! Log-to-metric extraction.
//!
//! Captured browser console lines are parsed into a closed set of typed
//! events, routed into a per-run accumulator keyed by member identity, media
//! type, and SSRC, and finally aggregated into per-stream statistics.

pub mod aggregate;
pub mod collector;
pub mod event;
pub mod types;

pub use aggregate::{MinuteStats, StreamStats, DEFAULT_LEADING_SAMPLE_SKIP, SAMPLES_PER_MINUTE};
pub use collector::{Collector, MemberLog, DEFAULT_MEMBER};
pub use event::{parse_line, LogEvent, VideoObservation, LOG_PREFIX};
pub use types::{
    ColorEvent, FrequencyEvent, MediaType, MetricSample, NativeReport, QrEvent, StreamDirection,
};

//! Medir: Metric Analysis and Assertions for Streaming Acceptance Tests
//!
//! Medir (Spanish: "to measure") turns the console-log output of an
//! instrumented streaming page into aggregated per-stream statistics,
//! correlates publisher and subscriber signal events into lag and sync
//! measurements, and checks everything against configurable threshold
//! profiles.
//!
//! # Pipeline
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │ Console    │    │ Collector  │    │ Aggregate/ │    │ Assertion  │
//! │ log lines  │───►│ (typed     │───►│ Lag / Sync │───►│ context +  │
//! │            │    │  events)   │    │ analysis   │    │ report     │
//! └────────────┘    └────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! Each test run owns its own [`collect::Collector`],
//! [`profile::ProfileSet`], and [`assertion::AssertionContext`]; concurrent
//! runs share nothing.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod assertion;
pub mod collect;
pub mod format;
pub mod lag;
pub mod logging;
pub mod math;
pub mod profile;
pub mod report;
pub mod result;

pub use assertion::{AssertionContext, AssertionRecord, Outcome, Sign};
pub use collect::aggregate::{StreamStats, DEFAULT_LEADING_SAMPLE_SKIP, SAMPLES_PER_MINUTE};
pub use collect::collector::{Collector, MemberLog, DEFAULT_MEMBER};
pub use collect::types::{MediaType, MetricSample, NativeReport, StreamDirection};
pub use lag::analyzer::{
    analyze_audio_lag, analyze_audio_rtmp_lag, analyze_video_lag, analyze_video_rtmp_lag, LagReport,
};
pub use lag::sync::{analyze_sync, SyncReport};
pub use profile::defaults::default_profiles;
pub use profile::resolve::{resolve_profiles, ChatMode, ProfileOverrides};
pub use profile::types::{AudioProfile, ChatProfile, ProfileSet, Threshold, VideoProfile};
pub use report::{ReportFormat, ReportHeader, RunReport};
pub use result::{MedirError, MedirResult};

//! Pass/fail threshold profiles.
//!
//! A profile is a named set of thresholds for one test category (video,
//! audio, chat). Profiles load from JSON files, may inherit from a base file,
//! accept per-field overrides from the command line, and are validated
//! against the built-in defaults before any browser interaction happens.

pub mod defaults;
pub mod resolve;
pub mod types;

pub use defaults::default_profiles;
pub use resolve::{resolve_profiles, ChatMode, ProfileOverrides};
pub use types::{
    AudioProfile, ChatProfile, ChatThresholds, PerMinuteThreshold, ProfileSet, Threshold,
    VideoProfile,
};

//! Typed profile records.
//!
//! Each test kind has a fixed record type; inheritance is a typed
//! partial-override merge performed on the JSON representation and validated
//! against the default profile's key set at load time. A `null` threshold is
//! a first-class "skip this assertion" sentinel, carried as `None`.

use crate::format::duration::{is_iso8601, parse_iso8601_ms};
use crate::result::{MedirError, MedirResult};
use serde::{Deserialize, Serialize};

/// A single threshold value: a plain number or an ISO-8601 duration string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    /// Plain numeric threshold (unit depends on the field)
    Number(f64),
    /// ISO-8601 duration string, `PT` prefix convention
    Duration(String),
}

impl Threshold {
    /// The threshold in comparable units (durations convert to milliseconds).
    pub fn as_ms(&self) -> MedirResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Duration(raw) => {
                if is_iso8601(raw) {
                    parse_iso8601_ms(raw)
                } else {
                    Err(MedirError::InvalidDuration { input: raw.clone() })
                }
            }
        }
    }
}

impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A threshold-over-time rule applied to each per-minute sample window.
///
/// `allowed` bounds the per-sample value; `times_per_minute` bounds how many
/// samples inside one window may violate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerMinuteThreshold {
    /// Per-sample bound
    pub allowed: f64,
    /// Maximum violations tolerated per minute window
    pub times_per_minute: f64,
}

/// Video stream thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoProfile {
    /// Relative path of a base profile file, or null
    pub inherits: Option<String>,
    /// Lower bound on mean bitrate in kbps
    pub min_bitrate_mean_kbps: Option<Threshold>,
    /// Upper bound on mean jitter in ms
    pub max_mean_jitter: Option<Threshold>,
    /// Upper bound on mean delay
    pub max_mean_delay: Option<Threshold>,
    /// Upper bound on any single delay sample
    pub max_delay: Option<Threshold>,
    /// Lower bound on mean frame rate
    pub min_mean_frame_rate: Option<Threshold>,
    /// Upper bound on mean frame rate
    pub max_mean_frame_rate: Option<Threshold>,
    /// Tolerance applied to the mean frame rate bounds; null skips them
    pub frame_rate_tolerance: Option<f64>,
    /// Per-minute rules counting samples below `allowed` fps
    pub min_frame_rate: Vec<PerMinuteThreshold>,
    /// Per-minute rules counting samples above `allowed` fps
    pub max_frame_rate: Vec<PerMinuteThreshold>,
    /// Per-minute rules counting samples above `allowed` ms of inter-frame delay
    pub interframe_delay_thresholds: Vec<PerMinuteThreshold>,
    /// Upper bound on total dropped frames
    pub max_dropped_frames: Option<Threshold>,
    /// Upper bound on detected freezes
    pub max_freezes: Option<Threshold>,
    /// Upper bound on resolution changes
    pub max_resolution_changes: Option<Threshold>,
    /// Lower bound on mean frame width
    pub min_frame_width: Option<Threshold>,
    /// Lower bound on mean frame height
    pub min_frame_height: Option<Threshold>,
    /// Expected codec name, or null to skip
    pub codec: Option<String>,
    /// Upper bound on mean lag, WebRTC publish path
    pub max_lag: Option<Threshold>,
    /// Upper bound on mean lag, RTMP push path
    pub max_rtmp_lag: Option<Threshold>,
    /// Upper bound on mean A/V sync offset
    pub max_average_sync: Option<Threshold>,
    /// Upper bound on any single A/V sync offset
    pub max_single_sync: Option<Threshold>,
    /// Upper bound on time from page load to first received frame
    pub max_stream_received_time: Option<Threshold>,
}

impl Default for VideoProfile {
    fn default() -> Self {
        Self {
            inherits: None,
            min_bitrate_mean_kbps: None,
            max_mean_jitter: None,
            max_mean_delay: None,
            max_delay: None,
            min_mean_frame_rate: None,
            max_mean_frame_rate: None,
            frame_rate_tolerance: None,
            min_frame_rate: Vec::new(),
            max_frame_rate: Vec::new(),
            interframe_delay_thresholds: Vec::new(),
            max_dropped_frames: None,
            max_freezes: None,
            max_resolution_changes: None,
            min_frame_width: None,
            min_frame_height: None,
            codec: None,
            max_lag: None,
            max_rtmp_lag: None,
            max_average_sync: None,
            max_single_sync: None,
            max_stream_received_time: None,
        }
    }
}

/// Audio stream thresholds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioProfile {
    /// Relative path of a base profile file, or null
    pub inherits: Option<String>,
    /// Lower bound on mean bitrate in kbps
    pub min_bitrate_mean_kbps: Option<Threshold>,
    /// Upper bound on mean jitter in ms
    pub max_mean_jitter: Option<Threshold>,
    /// Upper bound on any single jitter sample in ms
    pub max_jitter: Option<Threshold>,
    /// Upper bound on mean delay
    pub max_mean_delay: Option<Threshold>,
    /// Per-minute rules counting samples above `allowed` ms of delay
    pub audio_delay_thresholds: Vec<PerMinuteThreshold>,
    /// Lower bound on mean audio output level
    pub min_mean_output_level: Option<Threshold>,
    /// Expected codec name, or null to skip
    pub codec: Option<String>,
    /// Upper bound on mean lag, WebRTC publish path
    pub max_lag: Option<Threshold>,
    /// Upper bound on mean lag, RTMP push path
    pub max_rtmp_lag: Option<Threshold>,
}

/// Chat thresholds for one direction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatThresholds {
    /// Upper bound on message delivery lag
    pub max_message_lag: Option<Threshold>,
    /// Upper bound on history fetch time
    pub max_history_load_time: Option<Threshold>,
}

/// Chat thresholds, keyed by the configured mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatProfile {
    /// Relative path of a base profile file, or null
    pub inherits: Option<String>,
    /// Thresholds applied when the run sends messages
    pub send: Option<ChatThresholds>,
    /// Thresholds applied when the run receives messages
    pub receive: Option<ChatThresholds>,
}

/// The three profiles of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSet {
    /// Video thresholds
    pub video_profile: VideoProfile,
    /// Audio thresholds
    pub audio_profile: AudioProfile,
    /// Chat thresholds
    pub chat_profile: ChatProfile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_number_as_ms() {
        let t = Threshold::Number(42.5);
        assert!((t.as_ms().unwrap() - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_duration_as_ms() {
        let t = Threshold::Duration("PT0.35S".to_string());
        assert!((t.as_ms().unwrap() - 350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_bad_duration_is_error() {
        let t = Threshold::Duration("soon".to_string());
        assert!(t.as_ms().is_err());
    }

    #[test]
    fn test_threshold_deserializes_untagged() {
        let number: Threshold = serde_json::from_str("120").unwrap();
        assert_eq!(number, Threshold::Number(120.0));
        let duration: Threshold = serde_json::from_str("\"PT5S\"").unwrap();
        assert_eq!(duration, Threshold::Duration("PT5S".to_string()));
    }

    #[test]
    fn test_profile_null_field_is_skip_sentinel() {
        let profile: VideoProfile =
            serde_json::from_str(r#"{"maxLag": null, "minBitrateMeanKbps": 250}"#).unwrap();
        assert!(profile.max_lag.is_none());
        assert_eq!(profile.min_bitrate_mean_kbps, Some(Threshold::Number(250.0)));
    }

    #[test]
    fn test_profile_serializes_every_key() {
        // The default profile's serialized keys form the validation universe,
        // so no field may be skipped when None.
        let value = serde_json::to_value(VideoProfile::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("maxLag"));
        assert!(obj.contains_key("inherits"));
        assert!(obj.contains_key("interframeDelayThresholds"));
    }
}

//! Typed shapes of the console-log wire format.
//!
//! These mirror the JSON payloads emitted by the browser-side client. Any
//! change here is a breaking change requiring a coordinated update in the
//! emitting code.

use crate::format::color::Rgb;
use serde::{Deserialize, Deserializer, Serialize};

/// Media kind of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Video substream
    Video,
    /// Audio substream
    Audio,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Transport direction of a stream relative to the page under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamDirection {
    /// Subscriber side
    Download,
    /// Publisher side
    Upload,
}

/// One snapshot of a media stream's native stats at a timestamp.
///
/// Immutable once parsed; held in emission order per `(mediaType, ssrc)` key.
/// Emission order is chronological and significant for delta-based metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Media kind
    pub media_type: MediaType,
    /// Synchronization source identifier (number or string in the payload)
    #[serde(deserialize_with = "string_or_number")]
    pub ssrc: String,
    /// Transport direction
    pub direction: StreamDirection,
    /// Capture timestamp in milliseconds
    pub timestamp: f64,
    /// Transport-level counters
    pub native_report: NativeReport,
}

/// Transport-level counters carried inside a `MetricSample`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeReport {
    /// Cumulative bytes received
    pub bytes_received: Option<u64>,
    /// Cumulative packets lost
    pub packets_lost: Option<u64>,
    /// Jitter in ms
    pub jitter: Option<f64>,
    /// Jitter-buffer delay in ms
    pub jitter_buffer_delay: Option<f64>,
    /// Jitter-buffer target delay in ms
    pub jitter_buffer_target_delay: Option<f64>,
    /// Jitter-buffer emitted sample count
    pub jitter_buffer_emitted_count: Option<u64>,
    /// Current playout delay in ms
    pub current_delay: Option<f64>,
    /// Target playout delay in ms
    pub target_delay: Option<f64>,
    /// Instantaneous bitrate in kbps, computed by the client
    pub bitrate_kbps: Option<f64>,
    /// Decoded frame width
    pub frame_width: Option<f64>,
    /// Decoded frame height
    pub frame_height: Option<f64>,
    /// Decoder frame rate
    pub framerate_decoded: Option<f64>,
    /// Render frame rate
    pub framerate_output: Option<f64>,
    /// Frames dropped since the previous sample
    pub frames_dropped: Option<u64>,
    /// Maximum inter-frame delay in ms since the previous sample
    pub interframe_delay_max: Option<f64>,
    /// Audio output level (0-32767)
    pub audio_output_level: Option<f64>,
    /// Codec identifier
    pub codec_id: Option<String>,
}

/// A publisher- or subscriber-side color change observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorEvent {
    /// Event timestamp in milliseconds
    pub timestamp: f64,
    /// Observed fill color
    pub color: Rgb,
}

/// A publisher- or subscriber-side audio frequency observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEvent {
    /// Event timestamp in milliseconds
    pub timestamp: f64,
    /// Dominant tone frequency in Hz
    pub frequency: f64,
}

/// A QR-decoded publisher timestamp observed by an RTMP subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrEvent {
    /// Local decode timestamp in milliseconds
    pub timestamp: f64,
    /// Publisher timestamp embedded in the QR code, milliseconds
    pub qr_timestamp: f64,
}

/// SSRC keys arrive as JSON numbers or strings depending on the browser.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "ssrc must be a string or number, got {other}"
        ))),
    }
}

//! Console-log line parsing.
//!
//! Every line the browser client emits for the harness starts with the
//! literal `[Acceptance Testing] ` prefix, optionally followed by a
//! `[memberID:<id>]` marker, then one recognized tag and its payload. The tag
//! set is closed: each tag maps to exactly one `LogEvent` variant. Lines
//! without the prefix or with an unrecognized tag are ignored; a recognized
//! tag with an unparseable payload is a hard failure of the run.

use super::types::{ColorEvent, FrequencyEvent, MetricSample, QrEvent};
use crate::result::{MedirError, MedirResult};
use regex::Regex;

/// Literal prefix shared by every harness log line.
pub const LOG_PREFIX: &str = "[Acceptance Testing] ";

/// Member bucket used when no `[memberID:x]` marker is present.
pub const DEFAULT_MEMBER_ID: &str = "default";

const TAG_MEDIA_STREAM_STATS: &str = "[Media Stream Stats] ";
const TAG_PUBLISHER_VIDEO: &str = "[Publisher Video] ";
const TAG_PUBLISHER_AUDIO: &str = "[Publisher Audio] ";
const TAG_SUBSCRIBER_VIDEO: &str = "[Subscriber Video] ";
const TAG_SUBSCRIBER_AUDIO: &str = "[Subscriber Audio] ";
const TAG_STREAM_ID: &str = "[Stream ID] ";
const TAG_SESSION_ID: &str = "[Session ID] ";
const TAG_CHANNEL_TYPE: &str = "[Channel Type] ";
const TAG_URL_LOADED: &str = "[Url loaded] ";
const TAG_STREAM_RECEIVED: &str = "[Stream received] ";

/// One parsed console-log event.
#[derive(Clone, Debug, PartialEq)]
pub enum LogEvent {
    /// Native stats snapshot for one stream
    MediaStreamStats(MetricSample),
    /// Publisher-side color emission
    PublisherVideo(ColorEvent),
    /// Publisher-side tone emission
    PublisherAudio(FrequencyEvent),
    /// Subscriber-side video observation (color or QR timestamp)
    SubscriberVideo(VideoObservation),
    /// Subscriber-side tone observation
    SubscriberAudio(FrequencyEvent),
    /// Stream identifier reported by the SDK
    StreamId(String),
    /// Session identifier reported by the SDK
    SessionId(String),
    /// Channel type reported by the SDK
    ChannelType(String),
    /// Page load completion timestamp, milliseconds
    UrlLoaded(f64),
    /// First-frame reception timestamp, milliseconds
    StreamReceived(f64),
}

/// A subscriber video observation: QR-decoded timestamp on the RTMP path,
/// sampled color otherwise. Distinguished by payload shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum VideoObservation {
    /// QR-decoded publisher timestamp (RTMP ingest)
    Qr(QrEvent),
    /// Sampled frame color (WebRTC publish)
    Color(ColorEvent),
}

/// Parse one captured console line.
///
/// Returns `Ok(None)` for lines that are not harness output. Returns the
/// member identity (defaulting to [`DEFAULT_MEMBER_ID`]) alongside the event.
pub fn parse_line(line: &str) -> MedirResult<Option<(String, LogEvent)>> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(LOG_PREFIX) else {
        return Ok(None);
    };

    let member_re = Regex::new(r"^\[memberID:([^\]]+)\]\s*").unwrap();
    let (member, rest) = match member_re.captures(rest) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (caps[1].to_string(), &rest[end..])
        }
        None => (DEFAULT_MEMBER_ID.to_string(), rest),
    };

    let event = if let Some(payload) = rest.strip_prefix(TAG_MEDIA_STREAM_STATS) {
        Some(LogEvent::MediaStreamStats(parse_json(
            TAG_MEDIA_STREAM_STATS,
            payload,
        )?))
    } else if let Some(payload) = rest.strip_prefix(TAG_PUBLISHER_VIDEO) {
        Some(LogEvent::PublisherVideo(parse_json(
            TAG_PUBLISHER_VIDEO,
            payload,
        )?))
    } else if let Some(payload) = rest.strip_prefix(TAG_PUBLISHER_AUDIO) {
        Some(LogEvent::PublisherAudio(parse_json(
            TAG_PUBLISHER_AUDIO,
            payload,
        )?))
    } else if let Some(payload) = rest.strip_prefix(TAG_SUBSCRIBER_VIDEO) {
        Some(LogEvent::SubscriberVideo(parse_json(
            TAG_SUBSCRIBER_VIDEO,
            payload,
        )?))
    } else if let Some(payload) = rest.strip_prefix(TAG_SUBSCRIBER_AUDIO) {
        Some(LogEvent::SubscriberAudio(parse_json(
            TAG_SUBSCRIBER_AUDIO,
            payload,
        )?))
    } else if let Some(payload) = rest.strip_prefix(TAG_STREAM_ID) {
        Some(LogEvent::StreamId(payload.trim().to_string()))
    } else if let Some(payload) = rest.strip_prefix(TAG_SESSION_ID) {
        Some(LogEvent::SessionId(payload.trim().to_string()))
    } else if let Some(payload) = rest.strip_prefix(TAG_CHANNEL_TYPE) {
        Some(LogEvent::ChannelType(payload.trim().to_string()))
    } else if let Some(payload) = rest.strip_prefix(TAG_URL_LOADED) {
        Some(LogEvent::UrlLoaded(parse_scalar(TAG_URL_LOADED, payload)?))
    } else if let Some(payload) = rest.strip_prefix(TAG_STREAM_RECEIVED) {
        Some(LogEvent::StreamReceived(parse_scalar(
            TAG_STREAM_RECEIVED,
            payload,
        )?))
    } else {
        None
    };

    Ok(event.map(|e| (member, e)))
}

fn parse_json<T: serde::de::DeserializeOwned>(tag: &str, payload: &str) -> MedirResult<T> {
    serde_json::from_str(payload.trim()).map_err(|e| MedirError::MalformedPayload {
        tag: tag.trim().to_string(),
        message: e.to_string(),
    })
}

fn parse_scalar(tag: &str, payload: &str) -> MedirResult<f64> {
    payload
        .trim()
        .parse::<f64>()
        .map_err(|e| MedirError::MalformedPayload {
            tag: tag.trim().to_string(),
            message: e.to_string(),
        })
}

//! Per-run log accumulator.
//!
//! One `Collector` exists per test run. Concurrent runs are isolated by
//! construction: each run owns its collector, profile set, and assertion
//! context. Buckets preserve emission order, which later derivations
//! (freeze detection, resolution-change counts) depend on.

use super::event::{parse_line, LogEvent, VideoObservation};
use super::types::{ColorEvent, FrequencyEvent, MediaType, MetricSample, QrEvent};
use crate::result::MedirResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Member bucket used when no `[memberID:x]` marker is present.
pub const DEFAULT_MEMBER: &str = super::event::DEFAULT_MEMBER_ID;

/// Everything collected for one member identity.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLog {
    /// Video stats per SSRC, emission order
    pub video_samples: BTreeMap<String, Vec<MetricSample>>,
    /// Audio stats per SSRC, emission order
    pub audio_samples: BTreeMap<String, Vec<MetricSample>>,
    /// Publisher color emissions
    pub publisher_video: Vec<ColorEvent>,
    /// Publisher tone emissions
    pub publisher_audio: Vec<FrequencyEvent>,
    /// Subscriber color observations
    pub subscriber_video: Vec<ColorEvent>,
    /// Subscriber QR timestamp observations (RTMP path)
    pub subscriber_video_qr: Vec<QrEvent>,
    /// Subscriber tone observations
    pub subscriber_audio: Vec<FrequencyEvent>,
    /// Stream identifier, first report wins
    pub stream_id: Option<String>,
    /// Session identifier, first report wins
    pub session_id: Option<String>,
    /// Channel type, first report wins
    pub channel_type: Option<String>,
    /// Page load completion timestamp
    pub url_loaded: Option<f64>,
    /// First-frame reception timestamp
    pub stream_received: Option<f64>,
}

impl MemberLog {
    fn route(&mut self, event: LogEvent) {
        match event {
            LogEvent::MediaStreamStats(sample) => {
                let bucket = match sample.media_type {
                    MediaType::Video => &mut self.video_samples,
                    MediaType::Audio => &mut self.audio_samples,
                };
                bucket.entry(sample.ssrc.clone()).or_default().push(sample);
            }
            LogEvent::PublisherVideo(event) => self.publisher_video.push(event),
            LogEvent::PublisherAudio(event) => self.publisher_audio.push(event),
            LogEvent::SubscriberVideo(VideoObservation::Color(event)) => {
                self.subscriber_video.push(event);
            }
            LogEvent::SubscriberVideo(VideoObservation::Qr(event)) => {
                self.subscriber_video_qr.push(event);
            }
            LogEvent::SubscriberAudio(event) => self.subscriber_audio.push(event),
            LogEvent::StreamId(id) => {
                self.stream_id.get_or_insert(id);
            }
            LogEvent::SessionId(id) => {
                self.session_id.get_or_insert(id);
            }
            LogEvent::ChannelType(kind) => {
                self.channel_type.get_or_insert(kind);
            }
            LogEvent::UrlLoaded(ts) => {
                self.url_loaded.get_or_insert(ts);
            }
            LogEvent::StreamReceived(ts) => {
                self.stream_received.get_or_insert(ts);
            }
        }
    }
}

/// Per-run accumulator of parsed log events, keyed by member identity.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Collector {
    members: BTreeMap<String, MemberLog>,
}

impl Collector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one console line and route its event, if any.
    ///
    /// Returns whether the line carried a recognized event. Malformed
    /// payloads after a recognized tag are hard failures.
    pub fn push_line(&mut self, line: &str) -> MedirResult<bool> {
        match parse_line(line)? {
            Some((member, event)) => {
                self.members.entry(member).or_default().route(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Feed a whole captured console buffer; returns the recognized count.
    pub fn extend_lines<'a, I>(&mut self, lines: I) -> MedirResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut recognized = 0;
        for line in lines {
            if self.push_line(line)? {
                recognized += 1;
            }
        }
        Ok(recognized)
    }

    /// The log bucket for one member identity.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<&MemberLog> {
        self.members.get(id)
    }

    /// The bucket for lines without a member marker.
    #[must_use]
    pub fn default_member(&self) -> Option<&MemberLog> {
        self.members.get(DEFAULT_MEMBER)
    }

    /// All member buckets in key order.
    pub fn members(&self) -> impl Iterator<Item = (&String, &MemberLog)> {
        self.members.iter()
    }

    /// Number of member buckets.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn stats_line(ssrc: u32, timestamp: f64, bytes: u64) -> String {
        format!(
            concat!(
                "[Acceptance Testing] [Media Stream Stats] ",
                r#"{{"mediaType":"video","ssrc":{},"direction":"download","#,
                r#""timestamp":{},"nativeReport":{{"bytesReceived":{}}}}}"#
            ),
            ssrc, timestamp, bytes
        )
    }

    #[test]
    fn test_samples_keep_emission_order() {
        let mut collector = Collector::new();
        for (ts, bytes) in [(1.0, 100), (2.0, 250), (3.0, 400)] {
            collector.push_line(&stats_line(5, ts, bytes)).unwrap();
        }
        let member = collector.default_member().unwrap();
        let samples = &member.video_samples["5"];
        let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_streams_bucketed_by_ssrc() {
        let mut collector = Collector::new();
        collector.push_line(&stats_line(1, 1.0, 10)).unwrap();
        collector.push_line(&stats_line(2, 1.0, 20)).unwrap();
        collector.push_line(&stats_line(1, 2.0, 30)).unwrap();
        let member = collector.default_member().unwrap();
        assert_eq!(member.video_samples.len(), 2);
        assert_eq!(member.video_samples["1"].len(), 2);
        assert_eq!(member.video_samples["2"].len(), 1);
    }

    #[test]
    fn test_members_isolated() {
        let mut collector = Collector::new();
        collector
            .push_line("[Acceptance Testing] [memberID:a] [Stream ID] stream-a")
            .unwrap();
        collector
            .push_line("[Acceptance Testing] [memberID:b] [Stream ID] stream-b")
            .unwrap();
        assert_eq!(collector.member_count(), 2);
        assert_eq!(
            collector.member("a").unwrap().stream_id.as_deref(),
            Some("stream-a")
        );
        assert_eq!(
            collector.member("b").unwrap().stream_id.as_deref(),
            Some("stream-b")
        );
    }

    #[test]
    fn test_first_scalar_wins() {
        let mut collector = Collector::new();
        collector
            .push_line("[Acceptance Testing] [Session ID] first")
            .unwrap();
        collector
            .push_line("[Acceptance Testing] [Session ID] second")
            .unwrap();
        assert_eq!(
            collector.default_member().unwrap().session_id.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_extend_lines_counts_recognized() {
        let mut collector = Collector::new();
        let lines = [
            "unrelated output",
            "[Acceptance Testing] [Url loaded] 100",
            "[Acceptance Testing] [Stream received] 1350",
        ];
        let recognized = collector.extend_lines(lines).unwrap();
        assert_eq!(recognized, 2);
        let member = collector.default_member().unwrap();
        assert_eq!(member.url_loaded, Some(100.0));
        assert_eq!(member.stream_received, Some(1350.0));
    }

    #[test]
    fn test_qr_and_color_observations_split() {
        let mut collector = Collector::new();
        collector
            .push_line(concat!(
                "[Acceptance Testing] [Subscriber Video] ",
                r#"{"timestamp":100,"color":{"r":1,"g":2,"b":3}}"#
            ))
            .unwrap();
        collector
            .push_line(concat!(
                "[Acceptance Testing] [Subscriber Video] ",
                r#"{"timestamp":5300,"qrTimestamp":5100}"#
            ))
            .unwrap();
        let member = collector.default_member().unwrap();
        assert_eq!(member.subscriber_video.len(), 1);
        assert_eq!(member.subscriber_video_qr.len(), 1);
    }
}

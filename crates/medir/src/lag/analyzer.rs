//! Publisher/subscriber signal correlation.
//!
//! Colors match within a Euclidean tolerance because sampled pixel colors are
//! noisy; tone frequencies match exactly because the signal generator emits
//! quantized frequencies. Correlation misses are diagnostics, not failures:
//! the affected sample is excluded from the mean and the run continues.

use crate::collect::types::{ColorEvent, FrequencyEvent, QrEvent};
use crate::math::{average, color_distance};
use serde::Serialize;
use tracing::warn;

/// Maximum Euclidean RGB distance for a publisher color to match.
pub const COLOR_MATCH_TOLERANCE: f64 = 30.0;

/// RTMP benchmark marker tones occupy the high band at or above this
/// frequency; everything below is program audio and is filtered out.
pub const RTMP_MARKER_MIN_FREQUENCY: f64 = 8000.0;

/// One successfully correlated publisher/subscriber event pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelatedSample {
    /// Subscriber observation timestamp, ms
    pub subscriber_timestamp: f64,
    /// Matched publisher emission timestamp, ms
    pub publisher_timestamp: f64,
    /// `subscriber_timestamp - publisher_timestamp`
    pub lag: f64,
}

/// Outcome of one lag analysis pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LagReport {
    /// Publisher-side event count (0 on the RTMP video path)
    pub publisher_count: usize,
    /// Subscriber-side event count, after any band filtering
    pub subscriber_count: usize,
    /// Successfully correlated pairs, subscriber order
    pub samples: Vec<CorrelatedSample>,
    /// Correlation-miss diagnostics
    pub misses: Vec<String>,
    /// Mean lag over correlated samples, 0 when none
    pub mean_lag: f64,
}

impl LagReport {
    fn finish(mut self) -> Self {
        let lags: Vec<f64> = self.samples.iter().map(|s| s.lag).collect();
        self.mean_lag = average(&lags);
        self
    }
}

/// Correlate subscriber color observations with publisher color emissions.
///
/// Each subscriber event matches the nearest preceding publisher event whose
/// color lies within [`COLOR_MATCH_TOLERANCE`].
#[must_use]
pub fn analyze_video_lag(publisher: &[ColorEvent], subscriber: &[ColorEvent]) -> LagReport {
    let mut report = LagReport {
        publisher_count: publisher.len(),
        subscriber_count: subscriber.len(),
        ..LagReport::default()
    };

    for observed in subscriber {
        let matched = publisher
            .iter()
            .filter(|emitted| {
                emitted.timestamp <= observed.timestamp
                    && color_distance(emitted.color, observed.color) < COLOR_MATCH_TOLERANCE
            })
            .min_by(|a, b| nearest(observed.timestamp, a.timestamp, b.timestamp));
        match matched {
            Some(emitted) => report.samples.push(CorrelatedSample {
                subscriber_timestamp: observed.timestamp,
                publisher_timestamp: emitted.timestamp,
                lag: observed.timestamp - emitted.timestamp,
            }),
            None => {
                let note = format!(
                    "no publisher color match for subscriber event at {}ms (color {:.0},{:.0},{:.0})",
                    observed.timestamp, observed.color.r, observed.color.g, observed.color.b
                );
                warn!("{note}");
                report.misses.push(note);
            }
        }
    }

    report.finish()
}

/// RTMP video path: the subscriber decodes the publisher timestamp straight
/// from the frame's QR code, so no correlation search is needed.
#[must_use]
pub fn analyze_video_rtmp_lag(subscriber: &[QrEvent]) -> LagReport {
    let report = LagReport {
        publisher_count: 0,
        subscriber_count: subscriber.len(),
        samples: subscriber
            .iter()
            .map(|event| CorrelatedSample {
                subscriber_timestamp: event.timestamp,
                publisher_timestamp: event.qr_timestamp,
                lag: event.timestamp - event.qr_timestamp,
            })
            .collect(),
        ..LagReport::default()
    };
    report.finish()
}

/// Correlate subscriber tone observations with publisher tone emissions.
///
/// Frequencies match exactly; among publisher events of the identical
/// frequency emitted at or before the observation, the closest in time wins.
#[must_use]
pub fn analyze_audio_lag(publisher: &[FrequencyEvent], subscriber: &[FrequencyEvent]) -> LagReport {
    let mut report = LagReport {
        publisher_count: publisher.len(),
        subscriber_count: subscriber.len(),
        ..LagReport::default()
    };

    for observed in subscriber {
        let matched = publisher
            .iter()
            .filter(|emitted| {
                emitted.frequency == observed.frequency && emitted.timestamp <= observed.timestamp
            })
            .min_by(|a, b| nearest(observed.timestamp, a.timestamp, b.timestamp));
        match matched {
            Some(emitted) => report.samples.push(CorrelatedSample {
                subscriber_timestamp: observed.timestamp,
                publisher_timestamp: emitted.timestamp,
                lag: observed.timestamp - emitted.timestamp,
            }),
            None => {
                let note = format!(
                    "no publisher tone match for subscriber event at {}ms ({}Hz)",
                    observed.timestamp, observed.frequency
                );
                warn!("{note}");
                report.misses.push(note);
            }
        }
    }

    report.finish()
}

/// RTMP audio path: publisher events are replaced by a precomputed benchmark
/// tone schedule, and subscriber events are filtered to the reserved
/// high-band marker tones before correlation.
#[must_use]
pub fn analyze_audio_rtmp_lag(
    schedule: &[FrequencyEvent],
    subscriber: &[FrequencyEvent],
) -> LagReport {
    let markers: Vec<FrequencyEvent> = subscriber
        .iter()
        .copied()
        .filter(|event| event.frequency >= RTMP_MARKER_MIN_FREQUENCY)
        .collect();
    analyze_audio_lag(schedule, &markers)
}

fn nearest(target: f64, a: f64, b: f64) -> std::cmp::Ordering {
    let da = (target - a).abs();
    let db = (target - b).abs();
    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::format::color::Rgb;

    fn color(r: f64, g: f64, b: f64) -> Rgb {
        Rgb { r, g, b }
    }

    fn color_event(timestamp: f64, r: f64, g: f64, b: f64) -> ColorEvent {
        ColorEvent {
            timestamp,
            color: color(r, g, b),
        }
    }

    fn tone(timestamp: f64, frequency: f64) -> FrequencyEvent {
        FrequencyEvent {
            timestamp,
            frequency,
        }
    }

    #[test]
    fn test_video_lag_single_correlation() {
        let publisher = vec![color_event(50.0, 1.0, 1.0, 1.0)];
        let subscriber = vec![color_event(100.0, 0.0, 0.0, 0.0)];
        let report = analyze_video_lag(&publisher, &subscriber);
        assert_eq!(report.samples.len(), 1);
        assert!((report.samples[0].lag - 50.0).abs() < f64::EPSILON);
        assert!((report.mean_lag - 50.0).abs() < f64::EPSILON);
        assert!(report.misses.is_empty());
    }

    #[test]
    fn test_video_lag_picks_nearest_preceding() {
        let publisher = vec![
            color_event(10.0, 200.0, 0.0, 0.0),
            color_event(80.0, 200.0, 5.0, 5.0),
            color_event(120.0, 200.0, 0.0, 0.0), // after the observation
        ];
        let subscriber = vec![color_event(100.0, 205.0, 0.0, 0.0)];
        let report = analyze_video_lag(&publisher, &subscriber);
        assert_eq!(report.samples.len(), 1);
        assert!((report.samples[0].publisher_timestamp - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_video_lag_color_outside_tolerance_is_miss() {
        let publisher = vec![color_event(50.0, 200.0, 200.0, 200.0)];
        let subscriber = vec![color_event(100.0, 0.0, 0.0, 0.0)];
        let report = analyze_video_lag(&publisher, &subscriber);
        assert!(report.samples.is_empty());
        assert_eq!(report.misses.len(), 1);
        assert!((report.mean_lag - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_video_lag_miss_excluded_from_mean() {
        let publisher = vec![color_event(50.0, 0.0, 0.0, 0.0)];
        let subscriber = vec![
            color_event(100.0, 0.0, 0.0, 0.0),
            color_event(200.0, 255.0, 0.0, 0.0), // no matching emission
        ];
        let report = analyze_video_lag(&publisher, &subscriber);
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.misses.len(), 1);
        assert!((report.mean_lag - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_video_rtmp_lag_uses_embedded_timestamp() {
        let subscriber = vec![
            QrEvent {
                timestamp: 5300.0,
                qr_timestamp: 5100.0,
            },
            QrEvent {
                timestamp: 6400.0,
                qr_timestamp: 6000.0,
            },
        ];
        let report = analyze_video_rtmp_lag(&subscriber);
        assert_eq!(report.publisher_count, 0);
        assert_eq!(report.samples.len(), 2);
        assert!((report.mean_lag - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audio_lag_exact_frequency_match() {
        let publisher = vec![tone(100.0, 440.0), tone(300.0, 880.0)];
        let subscriber = vec![tone(450.0, 880.0)];
        let report = analyze_audio_lag(&publisher, &subscriber);
        assert_eq!(report.samples.len(), 1);
        assert!((report.samples[0].lag - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audio_lag_closest_at_or_before() {
        let publisher = vec![tone(100.0, 440.0), tone(400.0, 440.0), tone(600.0, 440.0)];
        let subscriber = vec![tone(500.0, 440.0)];
        let report = analyze_audio_lag(&publisher, &subscriber);
        assert!((report.samples[0].publisher_timestamp - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audio_lag_different_frequency_is_miss() {
        let publisher = vec![tone(100.0, 440.0)];
        let subscriber = vec![tone(200.0, 441.0)];
        let report = analyze_audio_lag(&publisher, &subscriber);
        assert!(report.samples.is_empty());
        assert_eq!(report.misses.len(), 1);
    }

    #[test]
    fn test_audio_rtmp_filters_low_band() {
        let schedule = vec![tone(0.0, 9000.0), tone(1000.0, 10_000.0)];
        let subscriber = vec![
            tone(150.0, 440.0),    // program audio, ignored
            tone(200.0, 9000.0),   // marker
            tone(1250.0, 10_000.0), // marker
        ];
        let report = analyze_audio_rtmp_lag(&schedule, &subscriber);
        assert_eq!(report.subscriber_count, 2);
        assert_eq!(report.samples.len(), 2);
        assert!((report.mean_lag - 225.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_inputs_zero_mean() {
        let report = analyze_video_lag(&[], &[]);
        assert_eq!(report.publisher_count, 0);
        assert!((report.mean_lag - 0.0).abs() < f64::EPSILON);
    }
}

//! Per-stream statistic aggregation.
//!
//! Computed once per run after stream monitoring ends, consumed once by the
//! assertion engine, never mutated afterward.

use super::types::{MediaType, MetricSample, StreamDirection};
use crate::math::{average, chunk};
use serde::Serialize;
use std::collections::HashSet;

/// Leading samples excluded from frame width/height averages, discarding
/// startup transients while the decoder settles.
pub const DEFAULT_LEADING_SAMPLE_SKIP: usize = 2;

/// Samples per chunked window, assuming ~1 stats sample per second.
pub const SAMPLES_PER_MINUTE: usize = 60;

/// Per-minute slice of the sample series, for threshold-over-time assertions.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteStats {
    /// Non-null frame rate samples inside the window
    pub frame_rates: Vec<f64>,
    /// Non-null inter-frame delay maxima inside the window
    pub interframe_delays: Vec<f64>,
    /// Non-null current-delay samples inside the window
    pub current_delays: Vec<f64>,
    /// Mean of `frame_rates`
    pub mean_frame_rate: f64,
    /// Maximum of `interframe_delays`
    pub max_interframe_delay: f64,
}

/// Aggregated statistics for one stream.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStats {
    /// Media kind, from the first sample
    pub media_type: MediaType,
    /// SSRC, from the first sample
    pub ssrc: String,
    /// Direction, from the first sample
    pub direction: StreamDirection,
    /// Codec identifier, from the first sample
    pub codec: Option<String>,
    /// Number of samples aggregated
    pub sample_count: usize,
    /// Mean bitrate in kbps
    pub bitrate_mean_kbps: f64,
    /// Maximum bitrate in kbps
    pub max_bitrate_kbps: f64,
    /// Mean jitter in ms
    pub jitter_mean: f64,
    /// Maximum jitter in ms
    pub max_jitter: f64,
    /// Mean jitter-buffer delay in ms
    pub jitter_buffer_delay_mean: f64,
    /// Mean current playout delay in ms
    pub current_delay_mean: f64,
    /// Maximum current playout delay in ms
    pub max_current_delay: f64,
    /// Mean target playout delay in ms
    pub target_delay_mean: f64,
    /// Mean audio output level
    pub audio_output_level_mean: f64,
    /// Mean decoder frame rate
    pub frame_rate_mean: f64,
    /// Maximum inter-frame delay in ms
    pub max_interframe_delay: f64,
    /// Total dropped frames
    pub dropped_frames: u64,
    /// Samples whose byte counter matched a previously seen value
    pub freezes: usize,
    /// Adjacent sample pairs with differing frame height
    pub resolution_changes: usize,
    /// Mean frame width, leading samples excluded
    pub frame_width_mean: f64,
    /// Mean frame height, leading samples excluded
    pub frame_height_mean: f64,
    /// Per-minute windows in chronological order
    pub minutes: Vec<MinuteStats>,
}

impl StreamStats {
    /// Aggregate an ordered sample sequence. `None` when the bucket is empty.
    ///
    /// `leading_skip` samples are excluded from the frame width/height means
    /// only; every other derivation sees the full sequence.
    #[must_use]
    pub fn from_samples(samples: &[MetricSample], leading_skip: usize) -> Option<Self> {
        let first = samples.first()?;

        let mut bitrates = Vec::new();
        let mut jitters = Vec::new();
        let mut jb_delays = Vec::new();
        let mut current_delays = Vec::new();
        let mut target_delays = Vec::new();
        let mut output_levels = Vec::new();
        let mut frame_rates = Vec::new();
        let mut widths = Vec::new();
        let mut heights = Vec::new();
        let mut max_interframe_delay = 0.0_f64;
        let mut dropped_frames = 0_u64;
        let mut freezes = 0_usize;
        let mut seen_bytes: HashSet<u64> = HashSet::new();
        let mut resolution_changes = 0_usize;
        let mut last_height: Option<f64> = None;

        for (index, sample) in samples.iter().enumerate() {
            let report = &sample.native_report;
            push_some(&mut bitrates, report.bitrate_kbps);
            push_some(&mut jitters, report.jitter);
            push_some(&mut jb_delays, report.jitter_buffer_delay);
            push_some(&mut current_delays, report.current_delay);
            push_some(&mut target_delays, report.target_delay);
            push_some(&mut output_levels, report.audio_output_level);
            push_some(&mut frame_rates, report.framerate_decoded);
            if index >= leading_skip {
                push_some(&mut widths, report.frame_width);
                push_some(&mut heights, report.frame_height);
            }
            if let Some(delay) = report.interframe_delay_max {
                max_interframe_delay = max_interframe_delay.max(delay);
            }
            if let Some(dropped) = report.frames_dropped {
                dropped_frames += dropped;
            }
            if let Some(bytes) = report.bytes_received {
                if !seen_bytes.insert(bytes) {
                    freezes += 1;
                }
            }
            if let Some(height) = report.frame_height {
                if let Some(prev) = last_height {
                    if (prev - height).abs() > f64::EPSILON {
                        resolution_changes += 1;
                    }
                }
                last_height = Some(height);
            }
        }

        let minutes = chunk(samples, SAMPLES_PER_MINUTE)
            .into_iter()
            .map(|window| MinuteStats::from_window(&window))
            .collect();

        Some(Self {
            media_type: first.media_type,
            ssrc: first.ssrc.clone(),
            direction: first.direction,
            codec: first.native_report.codec_id.clone(),
            sample_count: samples.len(),
            bitrate_mean_kbps: average(&bitrates),
            max_bitrate_kbps: max_of(&bitrates),
            jitter_mean: average(&jitters),
            max_jitter: max_of(&jitters),
            jitter_buffer_delay_mean: average(&jb_delays),
            current_delay_mean: average(&current_delays),
            max_current_delay: max_of(&current_delays),
            target_delay_mean: average(&target_delays),
            audio_output_level_mean: average(&output_levels),
            frame_rate_mean: average(&frame_rates),
            max_interframe_delay,
            dropped_frames,
            freezes,
            resolution_changes,
            frame_width_mean: average(&widths),
            frame_height_mean: average(&heights),
            minutes,
        })
    }
}

impl MinuteStats {
    fn from_window(window: &[MetricSample]) -> Self {
        let mut frame_rates = Vec::new();
        let mut interframe_delays = Vec::new();
        let mut current_delays = Vec::new();
        for sample in window {
            push_some(&mut frame_rates, sample.native_report.framerate_decoded);
            push_some(
                &mut interframe_delays,
                sample.native_report.interframe_delay_max,
            );
            push_some(&mut current_delays, sample.native_report.current_delay);
        }
        let mean_frame_rate = average(&frame_rates);
        let max_interframe_delay = max_of(&interframe_delays);
        Self {
            frame_rates,
            interframe_delays,
            current_delays,
            mean_frame_rate,
            max_interframe_delay,
        }
    }
}

fn push_some(bucket: &mut Vec<f64>, value: Option<f64>) {
    if let Some(v) = value {
        bucket.push(v);
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

//! Assertion groups mapping aggregated data onto profile thresholds.
//!
//! Each group is one call per stream (or per run) and records its assertions
//! on the shared context. Groups never short-circuit; a failure in one
//! assertion does not suppress the rest of the group.

use super::{AssertionContext, Sign};
use crate::collect::aggregate::StreamStats;
use crate::collect::collector::MemberLog;
use crate::lag::analyzer::LagReport;
use crate::lag::sync::SyncReport;
use crate::profile::types::{
    AudioProfile, ChatThresholds, PerMinuteThreshold, Threshold, VideoProfile,
};
use crate::result::MedirResult;

/// Page-level timing assertions.
///
/// The stream-received time is the distance from page load completion to the
/// first received frame. Missing either timestamp means the page never got
/// that far; the assertion is silently skipped and the stream assertions
/// will fail on their own terms.
pub fn assert_kpis(
    ctx: &mut AssertionContext,
    member: &MemberLog,
    profile: &VideoProfile,
) -> MedirResult<()> {
    let elapsed = match (member.url_loaded, member.stream_received) {
        (Some(loaded), Some(received)) => received - loaded,
        _ => f64::NAN,
    };
    ctx.assert_value(
        "Stream received time (ms)",
        elapsed,
        profile.max_stream_received_time.as_ref(),
        Sign::Lte,
    )
}

/// Video stream quality assertions against aggregated stats.
pub fn assert_video_quality(
    ctx: &mut AssertionContext,
    stats: &StreamStats,
    profile: &VideoProfile,
) -> MedirResult<()> {
    ctx.assert_value(
        "Video mean bitrate (kbps)",
        stats.bitrate_mean_kbps,
        profile.min_bitrate_mean_kbps.as_ref(),
        Sign::Gte,
    )?;
    ctx.assert_value(
        "Video mean jitter (ms)",
        stats.jitter_mean,
        profile.max_mean_jitter.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Video mean delay",
        stats.current_delay_mean,
        profile.max_mean_delay.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Video max delay",
        stats.max_current_delay,
        profile.max_delay.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_with_tolerance(
        "Video mean frame rate (min)",
        stats.frame_rate_mean,
        profile.min_mean_frame_rate.as_ref(),
        Sign::Gte,
        profile.frame_rate_tolerance,
    )?;
    ctx.assert_with_tolerance(
        "Video mean frame rate (max)",
        stats.frame_rate_mean,
        profile.max_mean_frame_rate.as_ref(),
        Sign::Lte,
        profile.frame_rate_tolerance,
    )?;
    ctx.assert_value(
        "Video dropped frames",
        stats.dropped_frames as f64,
        profile.max_dropped_frames.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Video freezes",
        stats.freezes as f64,
        profile.max_freezes.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Video resolution changes",
        stats.resolution_changes as f64,
        profile.max_resolution_changes.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Video mean frame width",
        stats.frame_width_mean,
        profile.min_frame_width.as_ref(),
        Sign::Gte,
    )?;
    ctx.assert_value(
        "Video mean frame height",
        stats.frame_height_mean,
        profile.min_frame_height.as_ref(),
        Sign::Gte,
    )?;
    ctx.assert_text(
        "Video codec",
        stats.codec.as_deref().unwrap_or(""),
        profile.codec.as_deref(),
        Sign::Eql,
    )?;

    assert_per_minute(
        ctx,
        "Video frame rate samples below",
        &profile.min_frame_rate,
        &stats.minutes,
        |minute| &minute.frame_rates,
        |value, allowed| value < allowed,
    )?;
    assert_per_minute(
        ctx,
        "Video frame rate samples above",
        &profile.max_frame_rate,
        &stats.minutes,
        |minute| &minute.frame_rates,
        |value, allowed| value > allowed,
    )?;
    assert_per_minute(
        ctx,
        "Video inter-frame delay samples above",
        &profile.interframe_delay_thresholds,
        &stats.minutes,
        |minute| &minute.interframe_delays,
        |value, allowed| value > allowed,
    )?;
    Ok(())
}

/// Audio stream quality assertions against aggregated stats.
pub fn assert_audio_quality(
    ctx: &mut AssertionContext,
    stats: &StreamStats,
    profile: &AudioProfile,
) -> MedirResult<()> {
    ctx.assert_value(
        "Audio mean bitrate (kbps)",
        stats.bitrate_mean_kbps,
        profile.min_bitrate_mean_kbps.as_ref(),
        Sign::Gte,
    )?;
    ctx.assert_value(
        "Audio mean jitter (ms)",
        stats.jitter_mean,
        profile.max_mean_jitter.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Audio max jitter (ms)",
        stats.max_jitter,
        profile.max_jitter.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Audio mean delay",
        stats.current_delay_mean,
        profile.max_mean_delay.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Audio mean output level",
        stats.audio_output_level_mean,
        profile.min_mean_output_level.as_ref(),
        Sign::Gte,
    )?;
    ctx.assert_text(
        "Audio codec",
        stats.codec.as_deref().unwrap_or(""),
        profile.codec.as_deref(),
        Sign::Eql,
    )?;
    assert_per_minute(
        ctx,
        "Audio delay samples above",
        &profile.audio_delay_thresholds,
        &stats.minutes,
        |minute| &minute.current_delays,
        |value, allowed| value > allowed,
    )?;
    Ok(())
}

/// Video lag assertions on a correlation report.
///
/// On the RTMP path there is no publisher event stream (timestamps come from
/// the frames themselves), so the publisher-count precondition is skipped
/// and the RTMP-specific lag bound applies.
pub fn assert_video_lag(
    ctx: &mut AssertionContext,
    report: &LagReport,
    profile: &VideoProfile,
    rtmp: bool,
) -> MedirResult<()> {
    for miss in &report.misses {
        ctx.note(miss.clone());
    }
    let count_expected = Some(Threshold::Number(0.0));
    if !rtmp {
        ctx.assert_value(
            "Video publisher events",
            report.publisher_count as f64,
            count_expected.as_ref(),
            Sign::Gt,
        )?;
    }
    ctx.assert_value(
        "Video subscriber events",
        report.subscriber_count as f64,
        count_expected.as_ref(),
        Sign::Gt,
    )?;
    ctx.assert_value(
        "Video correlated samples",
        report.samples.len() as f64,
        count_expected.as_ref(),
        Sign::Gt,
    )?;
    let bound = if rtmp {
        profile.max_rtmp_lag.as_ref()
    } else {
        profile.max_lag.as_ref()
    };
    ctx.assert_value("Video mean lag", report.mean_lag, bound, Sign::Lte)
}

/// Audio lag assertions on a correlation report.
pub fn assert_audio_lag(
    ctx: &mut AssertionContext,
    report: &LagReport,
    profile: &AudioProfile,
    rtmp: bool,
) -> MedirResult<()> {
    for miss in &report.misses {
        ctx.note(miss.clone());
    }
    let count_expected = Some(Threshold::Number(0.0));
    if !rtmp {
        ctx.assert_value(
            "Audio publisher events",
            report.publisher_count as f64,
            count_expected.as_ref(),
            Sign::Gt,
        )?;
    }
    ctx.assert_value(
        "Audio subscriber events",
        report.subscriber_count as f64,
        count_expected.as_ref(),
        Sign::Gt,
    )?;
    ctx.assert_value(
        "Audio correlated samples",
        report.samples.len() as f64,
        count_expected.as_ref(),
        Sign::Gt,
    )?;
    let bound = if rtmp {
        profile.max_rtmp_lag.as_ref()
    } else {
        profile.max_lag.as_ref()
    };
    ctx.assert_value("Audio mean lag", report.mean_lag, bound, Sign::Lte)
}

/// Sync offset assertions between two observation streams.
pub fn assert_sync(
    ctx: &mut AssertionContext,
    report: &SyncReport,
    profile: &VideoProfile,
) -> MedirResult<()> {
    ctx.assert_value(
        "Sync offset pairs",
        report.offsets.len() as f64,
        Some(Threshold::Number(0.0)).as_ref(),
        Sign::Gt,
    )?;
    ctx.assert_value(
        "Mean sync offset",
        report.average,
        profile.max_average_sync.as_ref(),
        Sign::Lte,
    )?;
    ctx.assert_value(
        "Max sync offset",
        report.max,
        profile.max_single_sync.as_ref(),
        Sign::Lte,
    )
}

/// Chat timing assertions for the configured direction.
pub fn assert_chat(
    ctx: &mut AssertionContext,
    message_lag_ms: f64,
    history_load_ms: f64,
    thresholds: Option<&ChatThresholds>,
) -> MedirResult<()> {
    let (lag_bound, history_bound) = thresholds
        .map_or((None, None), |t| {
            (t.max_message_lag.as_ref(), t.max_history_load_time.as_ref())
        });
    ctx.assert_value("Chat message lag", message_lag_ms, lag_bound, Sign::Lte)?;
    ctx.assert_value(
        "Chat history load time",
        history_load_ms,
        history_bound,
        Sign::Lte,
    )
}

/// Apply a set of per-minute rules to every minute window.
///
/// For each rule, every window is checked: the number of samples violating
/// the per-sample bound must not exceed `times_per_minute`.
fn assert_per_minute<'a, F, V>(
    ctx: &mut AssertionContext,
    label: &str,
    rules: &[PerMinuteThreshold],
    minutes: &'a [crate::collect::aggregate::MinuteStats],
    select: F,
    violates: V,
) -> MedirResult<()>
where
    F: Fn(&'a crate::collect::aggregate::MinuteStats) -> &'a Vec<f64>,
    V: Fn(f64, f64) -> bool,
{
    for rule in rules {
        let bound = Threshold::Number(rule.times_per_minute);
        for (index, minute) in minutes.iter().enumerate() {
            let count = select(minute)
                .iter()
                .filter(|&&value| violates(value, rule.allowed))
                .count();
            ctx.assert_value(
                &format!("{label} {} (minute {})", rule.allowed, index + 1),
                count as f64,
                Some(&bound),
                Sign::Lte,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::collect::aggregate::MinuteStats;
    use crate::collect::types::{MediaType, StreamDirection};
    use crate::lag::analyzer::CorrelatedSample;
    use crate::profile::defaults::default_profiles;

    fn video_stats() -> StreamStats {
        StreamStats {
            media_type: MediaType::Video,
            ssrc: "1".to_string(),
            direction: StreamDirection::Download,
            codec: Some("VP8".to_string()),
            sample_count: 60,
            bitrate_mean_kbps: 900.0,
            max_bitrate_kbps: 1200.0,
            jitter_mean: 12.0,
            max_jitter: 25.0,
            jitter_buffer_delay_mean: 40.0,
            current_delay_mean: 120.0,
            max_current_delay: 300.0,
            target_delay_mean: 100.0,
            audio_output_level_mean: 0.0,
            frame_rate_mean: 29.5,
            max_interframe_delay: 80.0,
            dropped_frames: 3,
            freezes: 0,
            resolution_changes: 1,
            frame_width_mean: 640.0,
            frame_height_mean: 360.0,
            minutes: vec![MinuteStats {
                frame_rates: vec![30.0; 60],
                interframe_delays: vec![40.0; 60],
                current_delays: vec![120.0; 60],
                mean_frame_rate: 30.0,
                max_interframe_delay: 40.0,
            }],
        }
    }

    #[test]
    fn test_video_quality_against_defaults_passes() {
        let profiles = default_profiles();
        let mut ctx = AssertionContext::new();
        assert_video_quality(&mut ctx, &video_stats(), &profiles.video_profile).unwrap();
        assert!(!ctx.has_failures(), "failures: {:?}", ctx.failed());
    }

    #[test]
    fn test_video_quality_flags_low_bitrate() {
        let profiles = default_profiles();
        let mut stats = video_stats();
        stats.bitrate_mean_kbps = 10.0;
        let mut ctx = AssertionContext::new();
        assert_video_quality(&mut ctx, &stats, &profiles.video_profile).unwrap();
        assert!(ctx
            .failed()
            .iter()
            .any(|m| m.contains("Video mean bitrate")));
    }

    #[test]
    fn test_frame_rate_tolerance_rescues_boundary() {
        let mut profile = default_profiles().video_profile;
        profile.min_mean_frame_rate = Some(Threshold::Number(30.0));
        profile.frame_rate_tolerance = Some(0.6);
        let mut ctx = AssertionContext::new();
        // 29.5 < 30 raw, but 29.5 + 0.6 >= 30
        assert_video_quality(&mut ctx, &video_stats(), &profile).unwrap();
        assert!(!ctx.has_failures(), "failures: {:?}", ctx.failed());
    }

    #[test]
    fn test_per_minute_rule_counts_violations() {
        let profiles = default_profiles();
        let mut stats = video_stats();
        // Three samples below the default 15fps floor, two allowed per minute
        stats.minutes[0].frame_rates[0] = 5.0;
        stats.minutes[0].frame_rates[1] = 5.0;
        stats.minutes[0].frame_rates[2] = 5.0;
        let mut ctx = AssertionContext::new();
        assert_video_quality(&mut ctx, &stats, &profiles.video_profile).unwrap();
        assert!(ctx
            .failed()
            .iter()
            .any(|m| m.contains("frame rate samples below")));
    }

    #[test]
    fn test_audio_quality_against_defaults() {
        let profiles = default_profiles();
        let stats = StreamStats {
            media_type: MediaType::Audio,
            codec: Some("opus".to_string()),
            bitrate_mean_kbps: 48.0,
            jitter_mean: 8.0,
            max_jitter: 20.0,
            current_delay_mean: 150.0,
            audio_output_level_mean: 4000.0,
            ..video_stats()
        };
        let mut ctx = AssertionContext::new();
        assert_audio_quality(&mut ctx, &stats, &profiles.audio_profile).unwrap();
        assert!(!ctx.has_failures(), "failures: {:?}", ctx.failed());
    }

    #[test]
    fn test_kpi_missing_timestamps_is_silent_skip() {
        let profiles = default_profiles();
        let member = MemberLog::default();
        let mut ctx = AssertionContext::new();
        assert_kpis(&mut ctx, &member, &profiles.video_profile).unwrap();
        assert!(ctx.records().is_empty());
    }

    #[test]
    fn test_kpi_stream_received_time() {
        let profiles = default_profiles();
        let member = MemberLog {
            url_loaded: Some(100.0),
            stream_received: Some(1350.0),
            ..MemberLog::default()
        };
        let mut ctx = AssertionContext::new();
        assert_kpis(&mut ctx, &member, &profiles.video_profile).unwrap();
        // 1250ms against the default PT8S bound
        assert_eq!(ctx.passed_count(), 1);
    }

    fn lag_report(publisher: usize, subscriber: usize, lags: &[f64]) -> LagReport {
        LagReport {
            publisher_count: publisher,
            subscriber_count: subscriber,
            samples: lags
                .iter()
                .map(|&lag| CorrelatedSample {
                    subscriber_timestamp: lag,
                    publisher_timestamp: 0.0,
                    lag,
                })
                .collect(),
            misses: Vec::new(),
            mean_lag: crate::math::average(lags),
        }
    }

    #[test]
    fn test_video_lag_webrtc_path() {
        let profiles = default_profiles();
        let report = lag_report(10, 10, &[50.0, 100.0]);
        let mut ctx = AssertionContext::new();
        assert_video_lag(&mut ctx, &report, &profiles.video_profile, false).unwrap();
        assert!(!ctx.has_failures(), "failures: {:?}", ctx.failed());
        assert_eq!(ctx.passed_count(), 4);
    }

    #[test]
    fn test_video_lag_rtmp_skips_publisher_count() {
        let profiles = default_profiles();
        let report = lag_report(0, 10, &[300.0]);
        let mut ctx = AssertionContext::new();
        assert_video_lag(&mut ctx, &report, &profiles.video_profile, true).unwrap();
        // subscriber events, correlated samples, mean lag vs PT5S
        assert_eq!(ctx.passed_count(), 3);
    }

    #[test]
    fn test_video_lag_no_correlation_fails() {
        let profiles = default_profiles();
        let report = lag_report(10, 10, &[]);
        let mut ctx = AssertionContext::new();
        assert_video_lag(&mut ctx, &report, &profiles.video_profile, false).unwrap();
        assert!(ctx
            .failed()
            .iter()
            .any(|m| m.contains("Video correlated samples")));
    }

    #[test]
    fn test_audio_lag_over_bound_fails() {
        let profiles = default_profiles();
        // Default maxLag is PT0.35S = 350ms
        let report = lag_report(5, 5, &[500.0]);
        let mut ctx = AssertionContext::new();
        assert_audio_lag(&mut ctx, &report, &profiles.audio_profile, false).unwrap();
        assert!(ctx.failed().iter().any(|m| m.contains("Audio mean lag")));
    }

    #[test]
    fn test_sync_assertions() {
        let profiles = default_profiles();
        let report = SyncReport {
            offsets: vec![10.0, 500.0],
            average: 255.0,
            max: 500.0,
            unmatched: 0,
        };
        let mut ctx = AssertionContext::new();
        assert_sync(&mut ctx, &report, &profiles.video_profile).unwrap();
        // Pairs > 0 passes; 255 > PT0.25S mean bound fails; 500 <= PT1S passes
        assert_eq!(ctx.failed_count(), 1);
        assert!(ctx.failed()[0].contains("Mean sync offset"));
    }

    #[test]
    fn test_chat_assertions() {
        let profiles = default_profiles();
        let thresholds = profiles.chat_profile.send.as_ref();
        let mut ctx = AssertionContext::new();
        // 200ms lag vs PT0.45S, 1500ms history vs PT2S
        assert_chat(&mut ctx, 200.0, 1500.0, thresholds).unwrap();
        assert_eq!(ctx.passed_count(), 2);
    }

    #[test]
    fn test_chat_without_thresholds_skips() {
        let mut ctx = AssertionContext::new();
        assert_chat(&mut ctx, 200.0, 1500.0, None).unwrap();
        assert_eq!(ctx.skipped_count(), 2);
    }
}

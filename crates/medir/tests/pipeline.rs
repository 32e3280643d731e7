//! End-to-end pipeline tests: captured console lines through collection,
//! aggregation, lag/sync analysis, assertions, and report assembly.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use medir::assertion::groups;
use medir::{
    analyze_audio_lag, analyze_sync, analyze_video_lag, default_profiles, AssertionContext,
    Collector, MedirError, ReportFormat, ReportHeader, RunReport, StreamStats,
    DEFAULT_LEADING_SAMPLE_SKIP,
};

fn video_stats_line(timestamp: f64, bytes: u64) -> String {
    format!(
        concat!(
            "[Acceptance Testing] [Media Stream Stats] ",
            r#"{{"mediaType":"video","ssrc":101,"direction":"download","timestamp":{},"#,
            r#""nativeReport":{{"bytesReceived":{},"bitrateKbps":800,"jitter":10,"#,
            r#""currentDelay":120,"targetDelay":110,"framerateDecoded":30,"#,
            r#""frameWidth":640,"frameHeight":360,"framesDropped":0,"#,
            r#""interframeDelayMax":40,"codecId":"VP8"}}}}"#
        ),
        timestamp, bytes
    )
}

fn audio_stats_line(timestamp: f64, bytes: u64) -> String {
    format!(
        concat!(
            "[Acceptance Testing] [Media Stream Stats] ",
            r#"{{"mediaType":"audio","ssrc":202,"direction":"download","timestamp":{},"#,
            r#""nativeReport":{{"bytesReceived":{},"bitrateKbps":48,"jitter":8,"#,
            r#""currentDelay":150,"audioOutputLevel":5000,"codecId":"opus"}}}}"#
        ),
        timestamp, bytes
    )
}

fn capture_run() -> Collector {
    let mut collector = Collector::new();
    let mut lines: Vec<String> = vec![
        "[Acceptance Testing] [Url loaded] 100".to_string(),
        "[Acceptance Testing] [Stream received] 1350".to_string(),
        "[Acceptance Testing] [Stream ID] us-east#demo#1.1".to_string(),
        "[Acceptance Testing] [Session ID] sess-42".to_string(),
        "[Acceptance Testing] [Channel Type] Live".to_string(),
        "random page output that the harness never emitted".to_string(),
        // Publisher signal emissions
        concat!(
            "[Acceptance Testing] [Publisher Video] ",
            r#"{"timestamp":2000,"color":{"r":10,"g":10,"b":10}}"#
        )
        .to_string(),
        concat!(
            "[Acceptance Testing] [Publisher Audio] ",
            r#"{"timestamp":2100,"frequency":440}"#
        )
        .to_string(),
        // Subscriber observations of the same signals
        concat!(
            "[Acceptance Testing] [Subscriber Video] ",
            r#"{"timestamp":2050,"color":{"r":12,"g":9,"b":11}}"#
        )
        .to_string(),
        concat!(
            "[Acceptance Testing] [Subscriber Audio] ",
            r#"{"timestamp":2250,"frequency":440}"#
        )
        .to_string(),
    ];
    for i in 0..5_u64 {
        lines.push(video_stats_line(1000.0 + 1000.0 * i as f64, 10_000 + i * 5_000));
        lines.push(audio_stats_line(1000.0 + 1000.0 * i as f64, 2_000 + i * 500));
    }
    collector
        .extend_lines(lines.iter().map(String::as_str))
        .unwrap();
    collector
}

#[test]
fn healthy_run_passes_default_profiles() {
    let collector = capture_run();
    let member = collector.default_member().unwrap();
    let profiles = default_profiles();
    let mut ctx = AssertionContext::new();

    groups::assert_kpis(&mut ctx, member, &profiles.video_profile).unwrap();

    for samples in member.video_samples.values() {
        let stats = StreamStats::from_samples(samples, DEFAULT_LEADING_SAMPLE_SKIP).unwrap();
        groups::assert_video_quality(&mut ctx, &stats, &profiles.video_profile).unwrap();
    }
    for samples in member.audio_samples.values() {
        let stats = StreamStats::from_samples(samples, DEFAULT_LEADING_SAMPLE_SKIP).unwrap();
        groups::assert_audio_quality(&mut ctx, &stats, &profiles.audio_profile).unwrap();
    }

    let video_lag = analyze_video_lag(&member.publisher_video, &member.subscriber_video);
    assert!((video_lag.mean_lag - 50.0).abs() < f64::EPSILON);
    groups::assert_video_lag(&mut ctx, &video_lag, &profiles.video_profile, false).unwrap();

    let audio_lag = analyze_audio_lag(&member.publisher_audio, &member.subscriber_audio);
    assert!((audio_lag.mean_lag - 150.0).abs() < f64::EPSILON);
    groups::assert_audio_lag(&mut ctx, &audio_lag, &profiles.audio_profile, false).unwrap();

    let video_ts: Vec<f64> = member.subscriber_video.iter().map(|e| e.timestamp).collect();
    let audio_ts: Vec<f64> = member.subscriber_audio.iter().map(|e| e.timestamp).collect();
    let sync = analyze_sync(&video_ts, &audio_ts);
    groups::assert_sync(&mut ctx, &sync, &profiles.video_profile).unwrap();

    assert!(!ctx.has_failures(), "failures: {:?}", ctx.failed());
    ctx.finish().unwrap();
}

#[test]
fn degraded_run_fails_and_reports() {
    let collector = capture_run();
    let member = collector.default_member().unwrap();
    let mut profiles = default_profiles();
    // Tighten the jitter bound below the observed 10ms mean
    profiles.video_profile.max_mean_jitter = Some(medir::Threshold::Number(5.0));

    let mut ctx = AssertionContext::new();
    let samples = member.video_samples.values().next().unwrap();
    let stats = StreamStats::from_samples(samples, DEFAULT_LEADING_SAMPLE_SKIP).unwrap();
    groups::assert_video_quality(&mut ctx, &stats, &profiles.video_profile).unwrap();

    assert!(ctx.has_failures());
    let err = ctx.finish().unwrap_err();
    assert!(matches!(err, MedirError::AssertionsFailed { failed: 1, .. }));

    let header = ReportHeader::new("https://backend.example", "demo", "chrome", "126.0", "ci");
    let report = RunReport::new(header, &ctx, vec![stats]);
    assert!(!report.is_success());
    let text = report.render_text();
    assert!(text.contains("Result: FAILED"));
    assert!(text.contains("Video mean jitter"));

    let dir = tempfile::tempdir().unwrap();
    let path = report
        .save(dir.path(), "report", "demo", ReportFormat::Json)
        .unwrap();
    let saved = std::fs::read_to_string(path).unwrap();
    assert!(saved.contains("\"failed\""));
}

#[test]
fn stream_identity_and_aggregates_survive_the_pipeline() {
    let collector = capture_run();
    let member = collector.default_member().unwrap();
    assert_eq!(member.stream_id.as_deref(), Some("us-east#demo#1.1"));
    assert_eq!(member.session_id.as_deref(), Some("sess-42"));
    assert_eq!(member.channel_type.as_deref(), Some("Live"));

    let stats =
        StreamStats::from_samples(&member.video_samples["101"], DEFAULT_LEADING_SAMPLE_SKIP)
            .unwrap();
    assert_eq!(stats.sample_count, 5);
    assert!((stats.bitrate_mean_kbps - 800.0).abs() < f64::EPSILON);
    assert_eq!(stats.freezes, 0);
    assert_eq!(stats.codec.as_deref(), Some("VP8"));
    assert_eq!(stats.minutes.len(), 1);

    let audio =
        StreamStats::from_samples(&member.audio_samples["202"], DEFAULT_LEADING_SAMPLE_SKIP)
            .unwrap();
    assert!((audio.audio_output_level_mean - 5000.0).abs() < f64::EPSILON);
    assert_eq!(audio.codec.as_deref(), Some("opus"));
}

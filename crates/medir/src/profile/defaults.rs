//! Built-in default profiles.
//!
//! These are the thresholds a run uses when no custom profile file is given,
//! and the key universe every custom profile is validated against.

use super::types::{
    AudioProfile, ChatProfile, ChatThresholds, PerMinuteThreshold, ProfileSet, Threshold,
    VideoProfile,
};

/// The built-in profile set.
#[must_use]
pub fn default_profiles() -> ProfileSet {
    ProfileSet {
        video_profile: default_video_profile(),
        audio_profile: default_audio_profile(),
        chat_profile: default_chat_profile(),
    }
}

fn default_video_profile() -> VideoProfile {
    VideoProfile {
        inherits: None,
        min_bitrate_mean_kbps: Some(Threshold::Number(250.0)),
        max_mean_jitter: Some(Threshold::Number(30.0)),
        max_mean_delay: Some(Threshold::Duration("PT0.25S".to_string())),
        max_delay: Some(Threshold::Duration("PT0.5S".to_string())),
        min_mean_frame_rate: Some(Threshold::Number(24.0)),
        max_mean_frame_rate: Some(Threshold::Number(35.0)),
        frame_rate_tolerance: Some(0.5),
        min_frame_rate: vec![PerMinuteThreshold {
            allowed: 15.0,
            times_per_minute: 2.0,
        }],
        max_frame_rate: vec![PerMinuteThreshold {
            allowed: 61.0,
            times_per_minute: 2.0,
        }],
        interframe_delay_thresholds: vec![PerMinuteThreshold {
            allowed: 100.0,
            times_per_minute: 2.0,
        }],
        max_dropped_frames: Some(Threshold::Number(30.0)),
        max_freezes: Some(Threshold::Number(2.0)),
        max_resolution_changes: Some(Threshold::Number(2.0)),
        min_frame_width: Some(Threshold::Number(320.0)),
        min_frame_height: Some(Threshold::Number(180.0)),
        codec: None,
        max_lag: Some(Threshold::Duration("PT0.35S".to_string())),
        max_rtmp_lag: Some(Threshold::Duration("PT5S".to_string())),
        max_average_sync: Some(Threshold::Duration("PT0.25S".to_string())),
        max_single_sync: Some(Threshold::Duration("PT1S".to_string())),
        max_stream_received_time: Some(Threshold::Duration("PT8S".to_string())),
    }
}

fn default_audio_profile() -> AudioProfile {
    AudioProfile {
        inherits: None,
        min_bitrate_mean_kbps: Some(Threshold::Number(25.0)),
        max_mean_jitter: Some(Threshold::Number(20.0)),
        max_jitter: Some(Threshold::Number(50.0)),
        max_mean_delay: Some(Threshold::Duration("PT0.25S".to_string())),
        audio_delay_thresholds: vec![PerMinuteThreshold {
            allowed: 400.0,
            times_per_minute: 2.0,
        }],
        min_mean_output_level: Some(Threshold::Number(1000.0)),
        codec: Some("opus".to_string()),
        max_lag: Some(Threshold::Duration("PT0.35S".to_string())),
        max_rtmp_lag: Some(Threshold::Duration("PT5S".to_string())),
    }
}

fn default_chat_profile() -> ChatProfile {
    ChatProfile {
        inherits: None,
        send: Some(ChatThresholds {
            max_message_lag: Some(Threshold::Duration("PT0.45S".to_string())),
            max_history_load_time: Some(Threshold::Duration("PT2S".to_string())),
        }),
        receive: Some(ChatThresholds {
            max_message_lag: Some(Threshold::Duration("PT0.45S".to_string())),
            max_history_load_time: Some(Threshold::Duration("PT2S".to_string())),
        }),
    }
}

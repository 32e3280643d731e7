//! Run report assembly and persistence.
//!
//! A report is assembled once per run from the assertion context and the
//! aggregated stream stats, rendered as text or JSON, and written under a
//! timestamped filename so repeated runs never clobber each other.

use crate::assertion::{AssertionContext, Outcome};
use crate::collect::aggregate::StreamStats;
use crate::result::MedirResult;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identity of one run, captured before monitoring starts.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    /// Backend the page under test talked to
    pub backend_uri: String,
    /// Channel alias under test
    pub channel_alias: String,
    /// Browser name
    pub browser_name: String,
    /// Browser version
    pub browser_version: String,
    /// Runtime environment label
    pub runtime: String,
    /// Unique run identifier
    pub run_id: Uuid,
}

impl ReportHeader {
    /// Capture a run identity with a fresh run id.
    #[must_use]
    pub fn new(
        backend_uri: impl Into<String>,
        channel_alias: impl Into<String>,
        browser_name: impl Into<String>,
        browser_version: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            backend_uri: backend_uri.into(),
            channel_alias: channel_alias.into(),
            browser_name: browser_name.into(),
            browser_version: browser_version.into(),
            runtime: runtime.into(),
            run_id: Uuid::new_v4(),
        }
    }
}

/// Output serialization of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// Machine-readable JSON
    Json,
}

impl ReportFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// The complete report of one run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Run identity
    pub header: ReportHeader,
    /// Messages of passed assertions
    pub passed: Vec<String>,
    /// Messages of failed assertions
    pub failed: Vec<String>,
    /// Messages of skipped assertions
    pub skipped: Vec<String>,
    /// Diagnostic notes
    pub notes: Vec<String>,
    /// Aggregated stats of every analyzed stream
    pub streams: Vec<StreamStats>,
}

impl RunReport {
    /// Assemble a report from a finished assertion context.
    #[must_use]
    pub fn new(header: ReportHeader, ctx: &AssertionContext, streams: Vec<StreamStats>) -> Self {
        let passed = ctx
            .records()
            .iter()
            .filter(|r| r.outcome == Outcome::Passed)
            .map(|r| r.message.clone())
            .collect();
        Self {
            header,
            passed,
            failed: ctx.failed().to_vec(),
            skipped: ctx.skipped().to_vec(),
            notes: ctx.notes().to_vec(),
            streams,
        }
    }

    /// Whether the run passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Render the report as readable text.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Run {}", self.header.run_id);
        let _ = writeln!(out, "Backend: {}", self.header.backend_uri);
        let _ = writeln!(out, "Channel: {}", self.header.channel_alias);
        let _ = writeln!(
            out,
            "Browser: {} {}",
            self.header.browser_name, self.header.browser_version
        );
        let _ = writeln!(out, "Runtime: {}", self.header.runtime);
        let _ = writeln!(
            out,
            "Result: {} ({} passed, {} failed, {} skipped)",
            if self.is_success() { "PASSED" } else { "FAILED" },
            self.passed.len(),
            self.failed.len(),
            self.skipped.len()
        );
        for (title, lines) in [
            ("Failed", &self.failed),
            ("Passed", &self.passed),
            ("Skipped", &self.skipped),
            ("Notes", &self.notes),
        ] {
            if lines.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{title}:");
            for line in lines {
                let _ = writeln!(out, "  {line}");
            }
        }
        out
    }

    /// Render the report in the requested format.
    pub fn render(&self, format: ReportFormat) -> MedirResult<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Write the report under `dir` as `<prefix>-<basename>-<millis>.<ext>`.
    ///
    /// The directory is created if missing; the millisecond timestamp keeps
    /// repeated runs of the same test from overwriting each other.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(
        &self,
        dir: &Path,
        prefix: &str,
        basename: &str,
        format: ReportFormat,
    ) -> MedirResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let millis = chrono::Utc::now().timestamp_millis();
        let path = dir.join(format!(
            "{prefix}-{basename}-{millis}.{}",
            format.extension()
        ));
        fs::write(&path, self.render(format)?)?;
        Ok(path)
    }
}

/// Environment labels attached to every exported quality record.
#[derive(Clone, Debug, Default)]
pub struct QualityEnv {
    /// Tenancy label
    pub tenancy: String,
    /// Session identifier reported by the page
    pub session_id: String,
    /// Stream identifier reported by the page
    pub stream_id: String,
    /// Originating component
    pub source: String,
    /// Resource under test
    pub resource: String,
    /// Runtime environment label
    pub runtime: String,
    /// Run duration in milliseconds
    pub elapsed: f64,
}

/// A metric value, numeric or textual.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    /// Numeric value, when the metric is numeric
    pub float: Option<f64>,
    /// Textual value, when the metric is textual
    pub string: Option<String>,
}

/// One exported quality metric, shaped for ingestion by an external
/// quality-tracking backend.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRecord {
    /// Export timestamp in milliseconds since the epoch
    pub timestamp: i64,
    /// Tenancy label
    pub tenancy: String,
    /// Session identifier
    pub session_id: String,
    /// Stream identifier
    pub stream_id: String,
    /// Originating component
    pub source: String,
    /// Resource under test
    pub resource: String,
    /// Media kind of the stream
    pub kind: String,
    /// Metric name
    pub metric: String,
    /// Metric value
    pub value: MetricValue,
    /// Run duration in milliseconds
    pub elapsed: f64,
    /// `<source>/<resource>/<kind>/<metric>`
    pub full_qualified_name: String,
    /// Exporting tool name
    pub tool: String,
    /// Exporting tool version
    pub tool_version: String,
    /// Runtime environment label
    pub runtime: String,
}

/// Flatten one stream's aggregated stats into quality records.
#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn quality_records(env: &QualityEnv, stats: &StreamStats) -> Vec<QualityRecord> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let kind = stats.media_type.to_string();
    let make = |metric: &str, value: MetricValue| QualityRecord {
        timestamp,
        tenancy: env.tenancy.clone(),
        session_id: env.session_id.clone(),
        stream_id: env.stream_id.clone(),
        source: env.source.clone(),
        resource: env.resource.clone(),
        kind: kind.clone(),
        metric: metric.to_string(),
        value,
        elapsed: env.elapsed,
        full_qualified_name: format!("{}/{}/{kind}/{metric}", env.source, env.resource),
        tool: "medir".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        runtime: env.runtime.clone(),
    };
    let float = |value: f64| MetricValue {
        float: Some(value),
        string: None,
    };

    let mut records = vec![
        make("bitrateMeanKbps", float(stats.bitrate_mean_kbps)),
        make("jitterMean", float(stats.jitter_mean)),
        make("currentDelayMean", float(stats.current_delay_mean)),
        make("frameRateMean", float(stats.frame_rate_mean)),
        make("droppedFrames", float(stats.dropped_frames as f64)),
        make("freezes", float(stats.freezes as f64)),
        make("resolutionChanges", float(stats.resolution_changes as f64)),
        make("frameWidthMean", float(stats.frame_width_mean)),
        make("frameHeightMean", float(stats.frame_height_mean)),
        make("audioOutputLevelMean", float(stats.audio_output_level_mean)),
    ];
    if let Some(codec) = &stats.codec {
        records.push(make(
            "codec",
            MetricValue {
                float: None,
                string: Some(codec.clone()),
            },
        ));
    }
    records
}

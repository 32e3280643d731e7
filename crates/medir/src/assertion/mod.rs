//! Tolerance-aware assertion engine.
//!
//! Every assertion of a run is recorded on an explicit per-run
//! `AssertionContext` value; nothing is process-global. Assertions never
//! short-circuit: all configured checks run to completion so the report
//! reflects the complete picture, and `finish` surfaces the aggregate
//! verdict to the orchestration layer.

pub mod groups;

use crate::format::display::format_actual;
use crate::profile::types::Threshold;
use crate::result::{MedirError, MedirResult};
use serde::Serialize;
use std::str::FromStr;
use tracing::{error, info, warn};

/// Comparison operator of an assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Loose equality
    Eql,
    /// Strict equality
    Deql,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
}

impl Sign {
    /// The operator's display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eql => "==",
            Self::Deql => "===",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Whether the raw numeric comparison holds.
    #[must_use]
    pub fn holds(self, actual: f64, expected: f64) -> bool {
        match self {
            Self::Eql | Self::Deql => (actual - expected).abs() < f64::EPSILON,
            Self::Gt => actual > expected,
            Self::Gte => actual >= expected,
            Self::Lt => actual < expected,
            Self::Lte => actual <= expected,
        }
    }

    const fn is_ordered(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl FromStr for Sign {
    type Err = MedirError;

    /// Any string outside the supported set is a configuration error and
    /// aborts the run.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eql" => Ok(Self::Eql),
            "deql" => Ok(Self::Deql),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            other => Err(MedirError::UnsupportedSign {
                sign: other.to_string(),
            }),
        }
    }
}

/// A resolved expected value: a plain number, or an ISO-8601 duration
/// converted to milliseconds for comparison but displayed in its raw form.
#[derive(Clone, Debug, PartialEq)]
pub enum Expected {
    /// Plain numeric expectation
    Number(f64),
    /// Duration expectation
    Duration {
        /// Original ISO-8601 string, used for display
        raw: String,
        /// Parsed milliseconds, used for comparison
        ms: f64,
    },
}

impl Expected {
    /// Resolve a profile threshold into a comparable expectation.
    pub fn from_threshold(threshold: &Threshold) -> MedirResult<Self> {
        match threshold {
            Threshold::Number(n) => Ok(Self::Number(*n)),
            Threshold::Duration(raw) => Ok(Self::Duration {
                raw: raw.clone(),
                ms: threshold.as_ms()?,
            }),
        }
    }

    /// The expectation in comparable units.
    #[must_use]
    pub const fn value(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Duration { ms, .. } => *ms,
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Number(n) => format!("{n}"),
            Self::Duration { raw, .. } => raw.clone(),
        }
    }
}

/// Outcome of one recorded assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Comparison held
    Passed,
    /// Comparison failed
    Failed,
    /// Expected value or tolerance was null
    Skipped,
}

/// One recorded assertion.
#[derive(Clone, Debug, Serialize)]
pub struct AssertionRecord {
    /// Assertion name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// Human-readable message
    pub message: String,
}

/// Tolerance configuration for one assertion.
enum ToleranceSetting {
    /// The assertion carries no tolerance concept
    NotConfigured,
    /// The profile set the tolerance to null: skip the assertion
    Disabled,
    /// Retry a failed ordered comparison with this allowance
    Value(f64),
}

/// Per-run assertion accumulator.
#[derive(Clone, Debug, Default)]
pub struct AssertionContext {
    assertions: Vec<AssertionRecord>,
    failed: Vec<String>,
    skipped: Vec<String>,
    notes: Vec<String>,
}

impl AssertionContext {
    /// Create an empty context for one run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a diagnostic note (correlation misses and the like). Notes are
    /// not failures; they surface in the report for debugging.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.notes.push(message);
    }

    /// Evaluate a numeric assertion without tolerance semantics.
    pub fn assert_value(
        &mut self,
        name: &str,
        actual: f64,
        expected: Option<&Threshold>,
        sign: Sign,
    ) -> MedirResult<()> {
        self.eval(name, actual, expected, sign, &ToleranceSetting::NotConfigured)
    }

    /// Evaluate a numeric assertion with an optional tolerance.
    ///
    /// A `None` tolerance means the profile disabled the check: it is
    /// recorded as skipped, like a null expected value.
    pub fn assert_with_tolerance(
        &mut self,
        name: &str,
        actual: f64,
        expected: Option<&Threshold>,
        sign: Sign,
        tolerance: Option<f64>,
    ) -> MedirResult<()> {
        let setting = match tolerance {
            Some(t) => ToleranceSetting::Value(t),
            None => ToleranceSetting::Disabled,
        };
        self.eval(name, actual, expected, sign, &setting)
    }

    /// Evaluate a text equality assertion (`eql`/`deql` only).
    ///
    /// Empty or whitespace values on either side mean no data was collected:
    /// the assertion is silently skipped.
    pub fn assert_text(
        &mut self,
        name: &str,
        actual: &str,
        expected: Option<&str>,
        sign: Sign,
    ) -> MedirResult<()> {
        let Some(expected) = expected else {
            self.record_skip(name, "no expected value configured");
            return Ok(());
        };
        if actual.trim().is_empty() || expected.trim().is_empty() {
            warn!("{name}: skipped, no data collected");
            return Ok(());
        }
        if !matches!(sign, Sign::Eql | Sign::Deql) {
            return Err(MedirError::UnsupportedSign {
                sign: format!("{} (ordered comparison on text)", sign.symbol()),
            });
        }
        if actual == expected {
            self.record(name, Outcome::Passed, format!("{name}: {actual} {} {expected}", sign.symbol()));
        } else {
            self.record(
                name,
                Outcome::Failed,
                format!("{name}: expected {actual} {} {expected}", sign.symbol()),
            );
        }
        Ok(())
    }

    fn eval(
        &mut self,
        name: &str,
        actual: f64,
        expected: Option<&Threshold>,
        sign: Sign,
        tolerance: &ToleranceSetting,
    ) -> MedirResult<()> {
        let Some(threshold) = expected else {
            self.record_skip(name, "no expected value configured");
            return Ok(());
        };
        if matches!(tolerance, ToleranceSetting::Disabled) {
            self.record_skip(name, "tolerance not configured");
            return Ok(());
        }
        let expected = Expected::from_threshold(threshold)?;
        if actual.is_nan() {
            warn!("{name}: skipped, no data collected");
            return Ok(());
        }

        let target = expected.value();
        let mut passed = sign.holds(actual, target);
        let mut applied_tolerance = None;
        if !passed && sign.is_ordered() {
            if let ToleranceSetting::Value(tol) = tolerance {
                if *tol > 0.0 {
                    let adjusted = match sign {
                        Sign::Gt | Sign::Gte => actual + tol,
                        Sign::Lt | Sign::Lte => actual - tol,
                        Sign::Eql | Sign::Deql => actual,
                    };
                    if sign.holds(adjusted, target) {
                        passed = true;
                        applied_tolerance = Some(*tol);
                    }
                }
            }
        }

        let shown = format_actual(actual, &expected, sign);
        let suffix = applied_tolerance
            .map(|tol| format!(" (tolerance {tol} applied)"))
            .unwrap_or_default();
        if passed {
            self.record(
                name,
                Outcome::Passed,
                format!("{name}: {shown} {} {}{suffix}", sign.symbol(), expected.display()),
            );
        } else {
            self.record(
                name,
                Outcome::Failed,
                format!(
                    "{name}: expected {shown} {} {}",
                    sign.symbol(),
                    expected.display()
                ),
            );
        }
        Ok(())
    }

    fn record(&mut self, name: &str, outcome: Outcome, message: String) {
        if outcome == Outcome::Failed {
            self.failed.push(message.clone());
        }
        self.assertions.push(AssertionRecord {
            name: name.to_string(),
            outcome,
            message,
        });
    }

    fn record_skip(&mut self, name: &str, reason: &str) {
        let message = format!("{name}: skipped ({reason})");
        self.skipped.push(message.clone());
        self.assertions.push(AssertionRecord {
            name: name.to_string(),
            outcome: Outcome::Skipped,
            message,
        });
    }

    /// All recorded assertions, evaluation order.
    #[must_use]
    pub fn records(&self) -> &[AssertionRecord] {
        &self.assertions
    }

    /// Messages of failed assertions.
    #[must_use]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Messages of skipped assertions.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Diagnostic notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Number of passed assertions.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.assertions
            .iter()
            .filter(|r| r.outcome == Outcome::Passed)
            .count()
    }

    /// Number of failed assertions.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of recorded skips.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Whether any assertion failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Replay the recorded assertions as a logged summary and surface the
    /// aggregate verdict, so a failing assertion fails the test at the
    /// orchestration layer.
    pub fn finish(&self) -> MedirResult<()> {
        for record in &self.assertions {
            match record.outcome {
                Outcome::Passed => info!("PASS {}", record.message),
                Outcome::Failed => error!("FAIL {}", record.message),
                Outcome::Skipped => info!("SKIP {}", record.message),
            }
        }
        let (passed, failed, skipped) = (
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
        );
        info!("assertions: {passed} passed, {failed} failed, {skipped} skipped");
        if self.has_failures() {
            return Err(MedirError::AssertionsFailed {
                failed,
                passed,
                skipped,
            });
        }
        Ok(())
    }
}

//! Result and error types for Medir.

use thiserror::Error;

/// Result type for Medir operations
pub type MedirResult<T> = Result<T, MedirError>;

/// Errors that can occur in Medir
///
/// Configuration errors (`InvalidProfileKeys`, `InvalidOverrideKey`,
/// `ChatModeMismatch`, `UnsupportedSign`, `UnsupportedRoundMode`) are fatal:
/// the run must stop before any collection or assertion happens.
#[derive(Debug, Error)]
pub enum MedirError {
    /// Unsupported rounding mode string
    #[error("Unsupported rounding mode '{mode}'. Supported modes: std, up, down")]
    UnsupportedRoundMode {
        /// The rejected mode string
        mode: String,
    },

    /// Unsupported comparison sign string
    #[error("Unsupported comparison sign '{sign}'. Supported signs: eql, deql, gt, gte, lt, lte")]
    UnsupportedSign {
        /// The rejected sign string
        sign: String,
    },

    /// Custom profile declares keys that do not exist on the default profile
    #[error("Invalid {kind} profile keys: [{}]", keys.join(", "))]
    InvalidProfileKeys {
        /// Profile kind (video, audio, chat)
        kind: String,
        /// The unknown keys
        keys: Vec<String>,
    },

    /// CLI override names a key that does not exist on the resolved profile
    #[error("Invalid {kind} override key '{key}'. Valid keys: [{}]", valid.join(", "))]
    InvalidOverrideKey {
        /// Profile kind (video, audio, chat)
        kind: String,
        /// The rejected key
        key: String,
        /// Keys that would have been accepted
        valid: Vec<String>,
    },

    /// Chat override key does not match the configured chat mode
    #[error("Chat override key '{key}' does not match configured chat mode '{mode}'")]
    ChatModeMismatch {
        /// The rejected key
        key: String,
        /// The configured chat mode
        mode: String,
    },

    /// Profile file could not be loaded or parsed
    #[error("Failed to load profile '{path}': {message}")]
    ProfileLoad {
        /// Path of the profile file
        path: String,
        /// Error message
        message: String,
    },

    /// A recognized log tag carried a payload that could not be parsed
    #[error("Malformed {tag} payload: {message}")]
    MalformedPayload {
        /// The log tag whose payload failed to parse
        tag: String,
        /// Error message
        message: String,
    },

    /// A threshold string was not a parseable ISO-8601 duration
    #[error("Invalid ISO-8601 duration '{input}'")]
    InvalidDuration {
        /// The rejected duration string
        input: String,
    },

    /// One or more assertions failed during the run
    #[error("{failed} of {} assertions failed ({passed} passed, {skipped} skipped)", failed + passed)]
    AssertionsFailed {
        /// Number of failed assertions
        failed: usize,
        /// Number of passed assertions
        passed: usize,
        /// Number of skipped assertions
        skipped: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

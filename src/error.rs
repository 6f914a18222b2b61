//! Error types for the internal seams.
//!
//! None of these escape the public entry points: `serialize`, `safer_format`
//! and the header redactor convert them into sentinel or fallback strings.
//! They are public so callers using the lower-level engine can match on them.

use thiserror::Error;

/// Failures of the serialization engine.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("serialization failed: {0}")]
    Custom(String),

    #[error("self referencing loop detected for member `{member}` of type {type_name}")]
    SelfReferencingLoop {
        member: String,
        type_name: &'static str,
    },

    #[error("map key must be a string, number or bool")]
    KeyMustBeString,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl serde::ser::Error for SerializeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SerializeError::Custom(msg.to_string())
    }
}

/// Failures of composite template substitution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("input string was not in a correct format at position {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },

    #[error("index {index} is out of range for {count} argument(s)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("format item at position {position} exceeds the {limit} limit")]
    LimitExceeded { position: usize, limit: usize },
}

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown verbosity `{0}` (expected quiet, normal or verbose)")]
    UnknownVerbosity(String),

    #[error("unknown event level `{0}`")]
    UnknownEventLevel(String),

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),

    #[error("invalid header policy: {0}")]
    Policy(#[from] serde_json::Error),
}

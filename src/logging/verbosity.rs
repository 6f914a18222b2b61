//! Verbosity threshold.
//!
//! Decides whether an event of a given severity should be emitted under the
//! configured logging verbosity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configured output verbosity, ordered `Quiet < Normal < Verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingVerbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Default for LoggingVerbosity {
    fn default() -> Self {
        LoggingVerbosity::Normal
    }
}

impl LoggingVerbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggingVerbosity::Quiet => "quiet",
            LoggingVerbosity::Normal => "normal",
            LoggingVerbosity::Verbose => "verbose",
        }
    }

    /// Level filter for the `log` facade matching this verbosity.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self {
            LoggingVerbosity::Quiet => log::LevelFilter::Error,
            LoggingVerbosity::Normal => log::LevelFilter::Info,
            LoggingVerbosity::Verbose => log::LevelFilter::Debug,
        }
    }

    /// Whether an event of `level` passes this verbosity.
    pub fn includes(self, level: EventLevel) -> bool {
        includes(self, level)
    }
}

impl fmt::Display for LoggingVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggingVerbosity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(LoggingVerbosity::Quiet),
            "normal" => Ok(LoggingVerbosity::Normal),
            "verbose" => Ok(LoggingVerbosity::Verbose),
            _ => Err(ConfigError::UnknownVerbosity(s.to_string())),
        }
    }
}

/// Event severity. Discriminants follow the conventional numeric event levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLevel {
    LogAlways = 0,
    Critical = 1,
    Error = 2,
    Warning = 3,
    Informational = 4,
    Verbose = 5,
}

impl EventLevel {
    /// Map a numeric level to an `EventLevel`, `None` if unrecognized.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(EventLevel::LogAlways),
            1 => Some(EventLevel::Critical),
            2 => Some(EventLevel::Error),
            3 => Some(EventLevel::Warning),
            4 => Some(EventLevel::Informational),
            5 => Some(EventLevel::Verbose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::LogAlways => "log_always",
            EventLevel::Critical => "critical",
            EventLevel::Error => "error",
            EventLevel::Warning => "warning",
            EventLevel::Informational => "informational",
            EventLevel::Verbose => "verbose",
        }
    }

    /// `log` facade level used when forwarding events of this severity.
    pub fn log_level(&self) -> log::Level {
        match self {
            EventLevel::LogAlways | EventLevel::Critical | EventLevel::Error => log::Level::Error,
            EventLevel::Warning => log::Level::Warn,
            EventLevel::Informational => log::Level::Info,
            EventLevel::Verbose => log::Level::Debug,
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "logalways" => Ok(EventLevel::LogAlways),
            "critical" => Ok(EventLevel::Critical),
            "error" => Ok(EventLevel::Error),
            "warning" | "warn" => Ok(EventLevel::Warning),
            "informational" | "info" => Ok(EventLevel::Informational),
            "verbose" | "debug" => Ok(EventLevel::Verbose),
            _ => Err(ConfigError::UnknownEventLevel(s.to_string())),
        }
    }
}

/// Minimum verbosity at which events of `level` are emitted.
pub fn minimum_verbosity(level: EventLevel) -> LoggingVerbosity {
    match level {
        EventLevel::LogAlways | EventLevel::Critical | EventLevel::Error => LoggingVerbosity::Quiet,
        EventLevel::Warning | EventLevel::Informational => LoggingVerbosity::Normal,
        EventLevel::Verbose => LoggingVerbosity::Verbose,
    }
}

/// Determine whether `level` is severe enough to be output at `verbosity`.
pub fn includes(verbosity: LoggingVerbosity, level: EventLevel) -> bool {
    verbosity >= minimum_verbosity(level)
}

/// Same as [`includes`] for a raw numeric level. Unrecognized levels
/// require `Verbose`.
pub fn includes_value(verbosity: LoggingVerbosity, level: u8) -> bool {
    match EventLevel::from_value(level) {
        Some(level) => includes(verbosity, level),
        None => verbosity >= LoggingVerbosity::Verbose,
    }
}

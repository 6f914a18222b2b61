//! SafeLog Core - Safe log serialization and PII redaction
//!
//! This crate turns arbitrary values into log-safe strings and strips
//! sensitive data from HTTP headers before they reach diagnostic telemetry.
//! Every public entry point is total: failures degrade to a sentinel or
//! fallback string instead of surfacing to the caller.
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `security` - PII wrapper, header collection, redaction policy and redactor
//! - `serialization` - Depth-bounded, cycle-safe serializer and exception records
//! - `formatting` - Composite templates and the safer formatter
//! - `logging` - Verbosity threshold, log sinks and structured log context
//! - `config` - Process settings read from the environment
//!
//! Python bindings are available behind the `python` feature.

pub mod config;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod security;
pub mod serialization;

#[cfg(feature = "python")]
mod python;

pub use error::{ConfigError, FormatError, SerializeError};
pub use formatting::{safer_format, LogArg};
pub use logging::{includes, EventLevel, LogSink, LoggingVerbosity};
pub use security::{redact_headers, scramble_headers, HeaderCollection, HeaderRedactor, Pii};
pub use serialization::{serialize, ExceptionRecord};

// Used by the exported logging macros.
#[doc(hidden)]
pub use log;

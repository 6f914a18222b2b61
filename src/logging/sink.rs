//! Log sinks.
//!
//! A sink is the only outbound dependency of this crate: the safer formatter
//! reports its failures through one. Sinks are fire-and-forget; nothing here
//! blocks on I/O beyond what the installed `log` backend does.

use std::error::Error;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::logging::structured::LogContext;
use crate::logging::verbosity::{EventLevel, LoggingVerbosity};
use crate::serialization::{serialize, ExceptionRecord};

/// Destination for severity-tagged messages and reported errors.
pub trait LogSink {
    /// Report an error as an error-level event.
    fn report_exception(&self, err: &dyn Error);

    /// Emit a message at the given severity.
    fn trace(&self, level: EventLevel, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn report_exception(&self, err: &dyn Error) {
        (**self).report_exception(err)
    }

    fn trace(&self, level: EventLevel, message: &str) {
        (**self).trace(level, message)
    }
}

/// Sink forwarding to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogCrateSink {
    ctx: LogContext,
}

impl LogCrateSink {
    pub fn new(ctx: LogContext) -> Self {
        Self { ctx }
    }
}

impl Default for LogCrateSink {
    fn default() -> Self {
        Self::new(LogContext::new("safelog"))
    }
}

impl LogSink for LogCrateSink {
    fn report_exception(&self, err: &dyn Error) {
        let record = ExceptionRecord::capture(err);
        crate::log_error!(self.ctx, "EXCEPTION", record = serialize(&record));
    }

    fn trace(&self, level: EventLevel, message: &str) {
        crate::log_event!(level.log_level(), self.ctx, message);
    }
}

/// Wraps a sink and drops traces the configured verbosity does not include.
/// Reported exceptions always pass through.
#[derive(Debug, Clone)]
pub struct VerbosityFilter<S> {
    inner: S,
    verbosity: LoggingVerbosity,
}

impl<S: LogSink> VerbosityFilter<S> {
    pub fn new(inner: S, verbosity: LoggingVerbosity) -> Self {
        Self { inner, verbosity }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: LogSink> LogSink for VerbosityFilter<S> {
    fn report_exception(&self, err: &dyn Error) {
        self.inner.report_exception(err);
    }

    fn trace(&self, level: EventLevel, message: &str) {
        if self.verbosity.includes(level) {
            self.inner.trace(level, message);
        }
    }
}

/// An event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Exception {
        at: DateTime<Utc>,
        message: String,
    },
    Trace {
        at: DateTime<Utc>,
        level: EventLevel,
        message: String,
    },
}

impl SinkEvent {
    pub fn message(&self) -> &str {
        match self {
            SinkEvent::Exception { message, .. } | SinkEvent::Trace { message, .. } => message,
        }
    }

    pub fn level(&self) -> EventLevel {
        match self {
            SinkEvent::Exception { .. } => EventLevel::Error,
            SinkEvent::Trace { level, .. } => *level,
        }
    }
}

/// In-memory sink that records every call.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn report_exception(&self, err: &dyn Error) {
        self.events.lock().push(SinkEvent::Exception {
            at: Utc::now(),
            message: err.to_string(),
        });
    }

    fn trace(&self, level: EventLevel, message: &str) {
        self.events.lock().push(SinkEvent::Trace {
            at: Utc::now(),
            level,
            message: message.to_string(),
        });
    }
}

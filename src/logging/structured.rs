//! Structured logging utilities.
//!
//! Provides context-aware logging with a context id and the operation name
//! included in every log message.

use std::fmt;

use uuid::Uuid;

/// Logging context for a redaction or formatting operation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub context_id: String,
    pub operation: Option<String>,
}

impl LogContext {
    pub fn new(context_id: &str) -> Self {
        Self {
            context_id: context_id.to_string(),
            operation: None,
        }
    }

    /// Create a context with a fresh short id.
    pub fn generate() -> Self {
        Self::new(&format!("ctx-{}", &Uuid::new_v4().to_string()[..8]))
    }

    pub fn with_operation(&self, operation: &str) -> Self {
        Self {
            context_id: self.context_id.clone(),
            operation: Some(operation.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some(op) => write!(f, "[ctx={}] [op={}]", self.context_id, op),
            None => write!(f, "[ctx={}]", self.context_id),
        }
    }
}

/// Log an event at `$level` with context and `key=value` pairs.
#[macro_export]
macro_rules! log_event {
    ($level:expr, $ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::log::log!(
            $level,
            concat!("{} {}" $(, " ", stringify!($key), "={}")*),
            $ctx,
            $event
            $(, $value)*
        )
    };
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::log_event!($crate::log::Level::Info, $($arg)+)
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => {
        $crate::log_event!($crate::log::Level::Warn, $($arg)+)
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::log_event!($crate::log::Level::Error, $($arg)+)
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::log_event!($crate::log::Level::Debug, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("ctx-123");
        assert_eq!(format!("{}", ctx), "[ctx=ctx-123]");

        let ctx_with_op = ctx.with_operation("redact_headers");
        assert_eq!(
            format!("{}", ctx_with_op),
            "[ctx=ctx-123] [op=redact_headers]"
        );
    }

    #[test]
    fn test_generated_context_id() {
        let ctx = LogContext::generate();
        assert!(ctx.context_id.starts_with("ctx-"));
        assert_eq!(ctx.context_id.len(), 12);
    }

    #[test]
    fn test_macros_expand() {
        let ctx = LogContext::new("ctx-macro");
        crate::log_debug!(ctx, "MACRO_CHECK", count = 3, name = "x");
        crate::log_info!(ctx, "MACRO_CHECK", count = 3);
        crate::log_warn!(ctx, "MACRO_CHECK");
        crate::log_error!(&ctx, "MACRO_CHECK", reason = "test",);
    }
}

//! Safer formatter.
//!
//! Substitutes safely serialized arguments into a composite template and
//! always returns a string. When substitution fails the error goes to the
//! sink and the caller gets the template followed by the raw arguments.

use serde::Serialize;

use crate::formatting::composite::format_composite;
use crate::logging::sink::LogSink;
use crate::logging::verbosity::EventLevel;
use crate::security::pii::scramble;
use crate::serialization::{classify, serialize, RootKind};

/// Separator between template and arguments in the fallback message.
pub const FALLBACK_DELIMITER: &str = " -- ";
/// Rendering of an absent argument in the fallback message.
pub const NULL_ARG: &str = "null";

/// An argument to [`safer_format`].
pub trait LogArg {
    /// Rendering used for substitution.
    fn to_log_string(&self) -> String;

    /// Rendering used in the fallback message. `None` for absent values.
    /// `Pii` renders scrambled here.
    fn to_raw_string(&self) -> Option<String>;
}

impl<T: ?Sized + Serialize> LogArg for T {
    fn to_log_string(&self) -> String {
        serialize(self)
    }

    fn to_raw_string(&self) -> Option<String> {
        match classify(self) {
            RootKind::Text(text) => Some(text),
            RootKind::Pii(raw) => Some(scramble(&raw)),
            RootKind::Null => None,
            RootKind::Exception | RootKind::Other => Some(serialize(self)),
        }
    }
}

/// Format `template` with `args`. Never fails.
///
/// With no arguments the template is returned verbatim and the sink is not
/// touched.
pub fn safer_format(sink: &dyn LogSink, template: &str, args: &[&dyn LogArg]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let serialized: Vec<String> = args.iter().map(|arg| arg.to_log_string()).collect();
    match format_composite(template, serialized.as_slice()) {
        Ok(formatted) => formatted,
        Err(err) => {
            sink.report_exception(&err);
            let message = fallback_message(template, args);
            sink.trace(EventLevel::Error, &format!("Failed to format: {}", message));
            message
        }
    }
}

fn fallback_message(template: &str, args: &[&dyn LogArg]) -> String {
    let mut message = template.to_string();
    for arg in args {
        message.push_str(FALLBACK_DELIMITER);
        match arg.to_raw_string() {
            Some(raw) => message.push_str(&raw),
            None => message.push_str(NULL_ARG),
        }
    }
    message
}

/// Format with [`safer_format`], taking arguments by expression.
///
/// ```
/// use safelog_core::logging::MemorySink;
/// use safelog_core::security::Pii;
///
/// let sink = MemorySink::new();
/// let out = safelog_core::safer_format!(sink, "{0} items for {1}", 5, Pii::new("alice"));
/// assert_eq!(out, "5 items for alice");
/// ```
#[macro_export]
macro_rules! safer_format {
    ($sink:expr, $template:expr $(,)?) => {
        $crate::formatting::safer_format(&$sink, $template, &[])
    };
    ($sink:expr, $template:expr, $($arg:expr),+ $(,)?) => {
        $crate::formatting::safer_format(
            &$sink,
            $template,
            &[$(&$arg as &dyn $crate::formatting::LogArg),+],
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::sink::{MemorySink, SinkEvent};
    use crate::security::pii::Pii;

    #[derive(serde::Serialize)]
    struct Item {
        sku: &'static str,
        qty: u32,
    }

    #[test]
    fn test_no_args_returns_template() {
        let sink = MemorySink::new();
        assert_eq!(safer_format(&sink, "{not a {0} template", &[]), "{not a {0} template");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_pii_serialized_unscrambled() {
        let sink = MemorySink::new();
        let pii = Pii::new("alice@example.com");
        let out = safer_format(&sink, "{0} items for {1}", &[&5, &pii]);
        assert_eq!(out, "5 items for alice@example.com");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_structured_args() {
        let sink = MemorySink::new();
        let item = Item { sku: "A-1", qty: 3 };
        let out = safer_format(&sink, "added {0}", &[&item]);
        assert_eq!(out, r#"added {"sku":"A-1","qty":3}"#);
    }

    #[test]
    fn test_failure_reports_and_falls_back() {
        let sink = MemorySink::new();
        let missing: Option<&str> = None;
        let out = safer_format(&sink, "{0} and {3}", &[&"a", &missing, &7]);
        assert_eq!(out, "{0} and {3} -- a -- null -- 7");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SinkEvent::Exception { .. }));
        assert_eq!(events[0].message(), "index 3 is out of range for 3 argument(s)");
        assert_eq!(events[1].level(), EventLevel::Error);
        assert_eq!(events[1].message(), "Failed to format: {0} and {3} -- a -- null -- 7");
    }

    #[test]
    fn test_fallback_scrambles_pii() {
        let sink = MemorySink::new();
        let pii = Pii::new("alice@example.com");
        let out = safer_format(&sink, "bad {", &[&pii]);
        assert!(out.starts_with("bad { -- [SCRAMBLED:"));
        assert!(!out.contains("alice"));
    }

    #[test]
    fn test_macro() {
        let sink = MemorySink::new();
        assert_eq!(crate::safer_format!(sink, "{x}"), "{x}");
        assert_eq!(
            crate::safer_format!(sink, "{0}/{1}", "a", Pii::new("b")),
            "a/b"
        );
        assert!(sink.is_empty());
    }
}

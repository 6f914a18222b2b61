//! Python bindings.
//!
//! Exposes the safe serializer, header redaction, PII scrambling, the safer
//! formatter and the verbosity check to Python via PyO3.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::formatting::{self, LogArg};
use crate::logging::{self, LogCrateSink, LoggingVerbosity};
use crate::security::{self, HeaderCollection, SentinelMarker};
use crate::serialization;

fn init_logger() {
    logging::init_logger(crate::config::settings().verbosity);
}

/// Serialize a JSON document the way log arguments are serialized.
///
/// Text that is not valid JSON is treated as a plain string and returned
/// unchanged.
#[pyfunction]
fn serialize_text(json: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&json) {
        Ok(value) => serialization::serialize(&value),
        Err(_) => json,
    }
}

/// Redact a dict of headers.
///
/// # Arguments
/// * `headers` - header name to a value or list of values
/// * `mark` - wrap values that are neither scrambled nor allow-listed in
///   `<pii>` markers
///
/// # Returns
/// A new dict of header name to list of values, in input order
#[pyfunction]
#[pyo3(signature = (headers, mark=false))]
fn redact_headers(py: Python<'_>, headers: &PyDict, mark: bool) -> PyResult<Py<PyAny>> {
    init_logger();

    let mut collection = HeaderCollection::new();
    for (name, values) in headers.iter() {
        let name: String = name.extract()?;
        let values: Vec<String> = match values.extract::<String>() {
            Ok(single) => vec![single],
            Err(_) => values.extract()?,
        };
        collection.insert(&name, values);
    }

    let marker = SentinelMarker::default();
    let redacted = if mark {
        security::redact_headers(&collection, Some(&marker))
    } else {
        security::redact_headers(&collection, None)
    };

    let out = PyDict::new(py);
    for (name, values) in redacted.iter() {
        out.set_item(name, values.to_vec())?;
    }
    Ok(out.into())
}

/// Scrambled form of a PII value.
#[pyfunction]
fn scramble_value(value: String) -> String {
    security::scramble(&value)
}

/// Format a composite template. Failures are logged and a fallback string is
/// returned.
#[pyfunction]
#[pyo3(signature = (template, args=Vec::new()))]
fn safer_format(template: String, args: Vec<Option<String>>) -> String {
    init_logger();
    let sink = LogCrateSink::default();
    let args: Vec<&dyn LogArg> = args.iter().map(|arg| arg as &dyn LogArg).collect();
    formatting::safer_format(&sink, &template, &args)
}

/// Whether `verbosity` includes events at the numeric `level`.
#[pyfunction]
fn includes(verbosity: &str, level: u8) -> PyResult<bool> {
    let verbosity: LoggingVerbosity = verbosity
        .parse()
        .map_err(|e: crate::error::ConfigError| PyValueError::new_err(e.to_string()))?;
    Ok(logging::includes_value(verbosity, level))
}

/// Python module definition
#[pymodule]
fn safelog_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(serialize_text, m)?)?;
    m.add_function(wrap_pyfunction!(redact_headers, m)?)?;
    m.add_function(wrap_pyfunction!(scramble_value, m)?)?;
    m.add_function(wrap_pyfunction!(safer_format, m)?)?;
    m.add_function(wrap_pyfunction!(includes, m)?)?;
    Ok(())
}

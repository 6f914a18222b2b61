//! Exception records.
//!
//! A serializable snapshot of an error and its causes. The method site
//! records where the error was captured; its `module` carries a backtrace
//! whose size depends on the build and the call stack, so the safe
//! serializer prunes it.

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Serialized type name of [`ExceptionRecord`].
pub const EXCEPTION_TYPE_NAME: &str = "ExceptionRecord";
/// Serialized type name of [`MethodSite`].
pub const METHOD_SITE_TYPE_NAME: &str = "MethodSite";
/// Field of [`MethodSite`] pruned before serialization.
pub const MODULE_FIELD: &str = "module";

/// Build-time information about the code that captured an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub path: String,
    pub crate_name: Option<String>,
    pub crate_version: Option<String>,
    pub backtrace: String,
}

impl ModuleInfo {
    fn capture(path: &str, crate_name: Option<&str>, crate_version: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            crate_name: crate_name.map(str::to_string),
            crate_version: crate_version.map(str::to_string),
            backtrace: Backtrace::capture().to_string(),
        }
    }
}

/// Where an error was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSite {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub module: ModuleInfo,
}

impl MethodSite {
    fn at(location: &Location<'_>, module: ModuleInfo) -> Self {
        Self {
            name: format!("{}:{}", location.file(), location.line()),
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
            module,
        }
    }
}

/// Snapshot of an error, its source chain and any aggregated causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub class_name: Option<String>,
    pub message: String,
    pub target_site: Option<MethodSite>,
    pub inner_exception: Option<Box<ExceptionRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_exceptions: Vec<ExceptionRecord>,
}

impl ExceptionRecord {
    /// Capture `err` at the caller's location. `Error::source` links become
    /// nested `inner_exception` records.
    #[track_caller]
    pub fn capture<E: Error + ?Sized>(err: &E) -> Self {
        let location = Location::caller();
        let module = ModuleInfo::capture(location.file(), None, None);
        Self::build(err, MethodSite::at(location, module))
    }

    /// Like [`ExceptionRecord::capture`] with the caller's module path and
    /// crate identity. Used by the [`exception_record!`](crate::exception_record) macro.
    #[track_caller]
    pub fn capture_in<E: Error + ?Sized>(
        err: &E,
        module_path: &str,
        crate_name: &str,
        crate_version: &str,
    ) -> Self {
        let location = Location::caller();
        let module = ModuleInfo::capture(module_path, Some(crate_name), Some(crate_version));
        Self::build(err, MethodSite::at(location, module))
    }

    /// A record wrapping several independent causes.
    #[track_caller]
    pub fn aggregate(message: impl Into<String>, causes: Vec<ExceptionRecord>) -> Self {
        let location = Location::caller();
        let module = ModuleInfo::capture(location.file(), None, None);
        Self {
            class_name: Some("AggregateError".to_string()),
            message: message.into(),
            target_site: Some(MethodSite::at(location, module)),
            inner_exception: causes.first().cloned().map(Box::new),
            inner_exceptions: causes,
        }
    }

    fn build<E: Error + ?Sized>(err: &E, site: MethodSite) -> Self {
        let type_name = std::any::type_name::<E>();
        let class_name = if type_name.starts_with("dyn ") {
            None
        } else {
            Some(type_name.to_string())
        };
        Self {
            class_name,
            message: err.to_string(),
            target_site: Some(site),
            inner_exception: err.source().map(|src| Box::new(Self::from_source(src))),
            inner_exceptions: Vec::new(),
        }
    }

    fn from_source(err: &(dyn Error + 'static)) -> Self {
        Self {
            class_name: None,
            message: err.to_string(),
            target_site: None,
            inner_exception: err.source().map(|src| Box::new(Self::from_source(src))),
            inner_exceptions: Vec::new(),
        }
    }
}

impl fmt::Display for ExceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class_name {
            Some(class) => write!(f, "{}: {}", class, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for ExceptionRecord {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner_exception
            .as_deref()
            .map(|inner| inner as &(dyn Error + 'static))
    }
}

/// Capture an error into an [`ExceptionRecord`] with the calling crate's
/// module path, name and version.
#[macro_export]
macro_rules! exception_record {
    ($err:expr) => {
        $crate::serialization::ExceptionRecord::capture_in(
            &$err,
            module_path!(),
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Outer {
        source: io::Error,
    }

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_capture_walks_source_chain() {
        let err = Outer {
            source: io::Error::new(io::ErrorKind::NotFound, "missing file"),
        };
        let record = ExceptionRecord::capture(&err);
        assert_eq!(record.message, "outer failed");
        assert!(record.class_name.as_deref().unwrap().ends_with("Outer"));
        let inner = record.inner_exception.as_ref().unwrap();
        assert_eq!(inner.message, "missing file");
        assert!(inner.inner_exception.is_none());
        assert!(record.target_site.as_ref().unwrap().file.ends_with("exception.rs"));
    }

    #[test]
    fn test_dyn_error_has_no_class_name() {
        let err: Box<dyn Error> = Box::new(io::Error::new(io::ErrorKind::Other, "boxed"));
        let record = ExceptionRecord::capture(err.as_ref());
        assert_eq!(record.class_name, None);
        assert_eq!(record.to_string(), "boxed");
    }

    #[test]
    fn test_macro_records_crate_identity() {
        let err = io::Error::new(io::ErrorKind::Other, "x");
        let record = crate::exception_record!(err);
        let module = &record.target_site.unwrap().module;
        assert_eq!(module.crate_name.as_deref(), Some(env!("CARGO_PKG_NAME")));
        assert!(module.path.contains("exception"));
    }

    #[test]
    fn test_aggregate() {
        let a = ExceptionRecord::capture(&io::Error::new(io::ErrorKind::Other, "a"));
        let b = ExceptionRecord::capture(&io::Error::new(io::ErrorKind::Other, "b"));
        let record = ExceptionRecord::aggregate("two failures", vec![a, b]);
        assert_eq!(record.inner_exceptions.len(), 2);
        assert_eq!(record.inner_exception.as_ref().unwrap().message, "a");
        assert!(record.to_string().starts_with("AggregateError"));
    }

    #[test]
    fn test_error_source() {
        let err = Outer {
            source: io::Error::new(io::ErrorKind::Other, "inner"),
        };
        let record = ExceptionRecord::capture(&err);
        assert_eq!(record.source().unwrap().to_string(), "inner");
    }
}

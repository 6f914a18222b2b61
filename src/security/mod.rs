//! Security module.
//!
//! PII wrapping, header redaction policy and the header redactor.

pub mod adapters;
pub mod headers;
pub mod pii;
pub mod policy;
pub mod redactor;

pub use adapters::*;
pub use headers::*;
pub use pii::*;
pub use policy::*;
pub use redactor::*;

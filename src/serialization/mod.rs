//! Serialization module.
//!
//! The bounded serialization engine, root classification, exception records
//! and the total `serialize` entry point used for log output.

pub mod engine;
pub mod exception;
pub mod probe;
pub mod safe;
pub mod settings;

pub use engine::{deserialize, serialize_with, to_tree, TRUNCATED};
pub use exception::*;
pub use probe::{classify, RootKind};
pub use safe::*;
pub use settings::*;

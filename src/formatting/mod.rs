//! Formatting module.
//!
//! Composite template substitution and the total safer formatter built on it.

pub mod composite;
pub mod safer;

pub use composite::format_composite;
pub use safer::*;

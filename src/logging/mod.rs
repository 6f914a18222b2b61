//! Logging module.
//!
//! Structured logging with context, the verbosity threshold and the sink
//! abstraction the safer formatter reports to.

pub mod sink;
pub mod structured;
pub mod verbosity;

pub use sink::*;
pub use structured::*;
pub use verbosity::*;

/// Initialize the `log` backend at the level implied by `verbosity`.
///
/// Safe to call repeatedly; only the first call installs a logger.
pub fn init_logger(verbosity: LoggingVerbosity) {
    let _ = env_logger::builder()
        .filter_level(verbosity.level_filter())
        .format_timestamp_millis()
        .try_init();
}

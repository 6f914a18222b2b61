//! Process settings.
//!
//! Read from the environment once, on first use, and immutable afterwards:
//! - `SAFELOG_VERBOSITY`: `quiet`, `normal` (default) or `verbose`
//! - `SAFELOG_SCRAMBLE_HEADERS`: comma-separated names added to the scramble-list
//! - `SAFELOG_ALLOWED_HEADERS`: comma-separated names added to the allow-list
//! - `SAFELOG_PII_SALT`: salt for scrambled values (random per process if unset)

use lazy_static::lazy_static;
use uuid::Uuid;

use crate::logging::verbosity::LoggingVerbosity;

pub const ENV_VERBOSITY: &str = "SAFELOG_VERBOSITY";
pub const ENV_SCRAMBLE_HEADERS: &str = "SAFELOG_SCRAMBLE_HEADERS";
pub const ENV_ALLOWED_HEADERS: &str = "SAFELOG_ALLOWED_HEADERS";
pub const ENV_PII_SALT: &str = "SAFELOG_PII_SALT";

lazy_static! {
    static ref SETTINGS: Settings = Settings::from_env();
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub verbosity: LoggingVerbosity,
    pub extra_scramble_headers: Vec<String>,
    pub extra_allowed_headers: Vec<String>,
    pub pii_salt: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let verbosity = match lookup(ENV_VERBOSITY) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("CONFIG_INVALID key={} error={}", ENV_VERBOSITY, e);
                LoggingVerbosity::default()
            }),
            None => LoggingVerbosity::default(),
        };

        let pii_salt = lookup(ENV_PII_SALT)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            verbosity,
            extra_scramble_headers: split_list(lookup(ENV_SCRAMBLE_HEADERS)),
            extra_allowed_headers: split_list(lookup(ENV_ALLOWED_HEADERS)),
            pii_salt,
        }
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// The process-wide settings.
pub fn settings() -> &'static Settings {
    &SETTINGS
}

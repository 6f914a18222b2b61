//! Header redaction policy.
//!
//! Two static lists decide what happens to a header value:
//! - scramble-list: always replaced by a one-way scrambled value
//! - allow-list: known not to carry PII, passed through verbatim
//!
//! Names are stored ASCII-lowercased and queries are lowercased the same way.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ConfigError;

/// Headers whose values are never logged in plaintext.
pub const HEADERS_TO_SCRAMBLE: &[&str] = &[
    "Authorization",
    "Proxy-Authorization",
    "Cookie",
    "Set-Cookie",
    "X-Api-Key",
    "X-Auth-Token",
    "X-Csrf-Token",
    "X-Amz-Security-Token",
];

/// Request headers known not to carry PII.
pub const ALLOWED_NON_PII_REQUEST_HEADERS: &[&str] = &[
    "Accept",
    "Accept-Encoding",
    "Accept-Language",
    "Cache-Control",
    "Connection",
    "Content-Encoding",
    "Content-Length",
    "Content-Type",
    "Date",
    "Expect",
    "Host",
    "Pragma",
    "Transfer-Encoding",
    "User-Agent",
    "traceparent",
    "tracestate",
    "x-ms-client-request-id",
    "x-ms-request-id",
    "x-ms-correlation-request-id",
    "x-ms-return-client-request-id",
];

lazy_static! {
    /// RFC 7230 `token`.
    static ref HEADER_NAME_PATTERN: Regex =
        Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").unwrap();

    static ref DEFAULT_POLICY: HeaderPolicy = HeaderPolicy::from_settings(config::settings());
}

/// Check that `name` is a syntactically valid header name.
pub fn is_valid_header_name(name: &str) -> bool {
    HEADER_NAME_PATTERN.is_match(name)
}

/// Scramble-list and allow-list of header names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPolicy {
    #[serde(default, deserialize_with = "deserialize_names")]
    scramble: HashSet<String>,
    #[serde(default, deserialize_with = "deserialize_names")]
    allow: HashSet<String>,
}

fn deserialize_names<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    let mut set = HashSet::with_capacity(names.len());
    for name in names {
        if !is_valid_header_name(&name) {
            return Err(serde::de::Error::custom(format!(
                "invalid header name `{}`",
                name
            )));
        }
        set.insert(name.to_ascii_lowercase());
    }
    Ok(set)
}

impl HeaderPolicy {
    /// Empty policy: nothing scrambled, nothing allow-listed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in lists.
    pub fn builtin() -> Self {
        Self {
            scramble: HEADERS_TO_SCRAMBLE
                .iter()
                .map(|n| n.to_ascii_lowercase())
                .collect(),
            allow: ALLOWED_NON_PII_REQUEST_HEADERS
                .iter()
                .map(|n| n.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Built-in lists extended with the names from the process settings.
    /// Invalid names are logged and skipped.
    pub fn from_settings(settings: &config::Settings) -> Self {
        let mut policy = Self::builtin();
        for name in &settings.extra_scramble_headers {
            if let Err(e) = policy.add_scrambled(name) {
                log::warn!("HEADER_POLICY_NAME_SKIPPED list=scramble error={}", e);
            }
        }
        for name in &settings.extra_allowed_headers {
            if let Err(e) = policy.add_allowed(name) {
                log::warn!("HEADER_POLICY_NAME_SKIPPED list=allow error={}", e);
            }
        }
        log::debug!(
            "HEADER_POLICY_LOADED scramble={} allow={}",
            policy.scramble.len(),
            policy.allow.len()
        );
        policy
    }

    /// Parse a policy from `{"scramble": [...], "allow": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn add_scrambled(&mut self, name: &str) -> Result<(), ConfigError> {
        let name = normalize(name)?;
        self.scramble.insert(name);
        Ok(())
    }

    pub fn add_allowed(&mut self, name: &str) -> Result<(), ConfigError> {
        let name = normalize(name)?;
        self.allow.insert(name);
        Ok(())
    }

    pub fn with_scrambled(mut self, names: &[&str]) -> Result<Self, ConfigError> {
        for name in names {
            self.add_scrambled(name)?;
        }
        Ok(self)
    }

    pub fn with_allowed(mut self, names: &[&str]) -> Result<Self, ConfigError> {
        for name in names {
            self.add_allowed(name)?;
        }
        Ok(self)
    }

    pub fn is_scrambled(&self, name: &str) -> bool {
        self.scramble.contains(&name.to_ascii_lowercase())
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allow.contains(&name.to_ascii_lowercase())
    }
}

fn normalize(name: &str) -> Result<String, ConfigError> {
    let trimmed = name.trim();
    if !is_valid_header_name(trimmed) {
        return Err(ConfigError::InvalidHeaderName(name.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// The process-wide policy, built once from the settings on first use.
pub fn default_policy() -> &'static HeaderPolicy {
    &DEFAULT_POLICY
}

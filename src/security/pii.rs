//! PII wrapper.
//!
//! Marks a string as personally identifiable information. The raw value is
//! only reachable through [`Pii::value`] or serialization; `Display` and
//! `Debug` show the scrambled form.

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::config;

/// Newtype name used when a `Pii` is handed to a serde serializer. The safe
/// serializer recognizes it to return the raw value unquoted.
pub const PII_TYPE_NAME: &str = "Pii";

/// Number of hex characters of the digest kept in a scrambled value.
const SCRAMBLE_HEX_LEN: usize = 16;

/// A sensitive string value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Pii {
    value: String,
}

impl Pii {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw value. Only for code that has already decided the consumer
    /// may see it.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// One-way form of the value, safe to persist long-term.
    pub fn scrambled_value(&self) -> String {
        scramble(&self.value)
    }
}

/// Salted SHA-256 of `raw`, truncated and wrapped as `[SCRAMBLED:<hex>]`.
///
/// Stable for equal input within a process. Stable across processes only
/// when `SAFELOG_PII_SALT` is set.
pub fn scramble(raw: &str) -> String {
    scramble_with_salt(raw, config::settings().pii_salt.as_bytes())
}

pub(crate) fn scramble_with_salt(raw: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update([0u8]);
    hasher.update(raw.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("[SCRAMBLED:{}]", &digest[..SCRAMBLE_HEX_LEN])
}

impl From<String> for Pii {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Pii {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Pii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scrambled_value())
    }
}

impl fmt::Debug for Pii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pii({})", self.scrambled_value())
    }
}

impl Serialize for Pii {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(PII_TYPE_NAME, &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_raw() {
        let pii = Pii::new("alice@example.com");
        assert_eq!(pii.value(), "alice@example.com");
    }

    #[test]
    fn test_scrambled_differs_from_raw() {
        let pii = Pii::new("alice@example.com");
        let scrambled = pii.scrambled_value();
        assert_ne!(scrambled, "alice@example.com");
        assert!(!scrambled.contains("alice"));
        assert!(scrambled.starts_with("[SCRAMBLED:"));
        assert_eq!(scrambled.len(), "[SCRAMBLED:]".len() + SCRAMBLE_HEX_LEN);
    }

    #[test]
    fn test_scramble_is_stable_within_process() {
        assert_eq!(scramble("token"), scramble("token"));
        assert_ne!(scramble("token"), scramble("token2"));
    }

    #[test]
    fn test_salt_changes_output() {
        assert_ne!(
            scramble_with_salt("secret", b"one"),
            scramble_with_salt("secret", b"two")
        );
    }

    #[test]
    fn test_empty_value_is_scrambled() {
        assert_ne!(Pii::new("").scrambled_value(), "");
    }

    #[test]
    fn test_display_and_debug_hide_raw() {
        let pii = Pii::new("555-123-4567");
        assert!(!format!("{}", pii).contains("555"));
        assert!(!format!("{:?}", pii).contains("555"));
    }

    #[test]
    fn test_plain_json_serialization_is_raw() {
        let pii = Pii::new("bob");
        assert_eq!(serde_json::to_string(&pii).unwrap(), "\"bob\"");
    }
}

//! Header redaction.
//!
//! For every header in a collection:
//! 1. scramble-listed: each value replaced by its scrambled form
//! 2. otherwise, with a marker and not allow-listed: each value replaced by
//!    the marker's wrapped form
//! 3. otherwise: value kept verbatim

use crate::security::headers::HeaderCollection;
use crate::security::pii::Pii;
use crate::security::policy::{default_policy, HeaderPolicy};

/// Produces a visibly wrapped form of a PII value, for viewers with
/// elevated access. The wrapped form is stripped before durable storage.
pub trait PiiMarker {
    fn mark(&self, pii: &Pii) -> String;
}

impl<F> PiiMarker for F
where
    F: Fn(&Pii) -> String,
{
    fn mark(&self, pii: &Pii) -> String {
        self(pii)
    }
}

/// Wraps values between a start and an end token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelMarker {
    pub start: String,
    pub end: String,
}

impl SentinelMarker {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for SentinelMarker {
    fn default() -> Self {
        Self::new("<pii>", "</pii>")
    }
}

impl PiiMarker for SentinelMarker {
    fn mark(&self, pii: &Pii) -> String {
        format!("{}{}{}", self.start, pii.value(), self.end)
    }
}

/// Applies a [`HeaderPolicy`] and an optional [`PiiMarker`] to header collections.
#[derive(Clone, Copy)]
pub struct HeaderRedactor<'a> {
    policy: &'a HeaderPolicy,
    marker: Option<&'a dyn PiiMarker>,
}

impl Default for HeaderRedactor<'static> {
    fn default() -> Self {
        Self::new(default_policy())
    }
}

impl<'a> HeaderRedactor<'a> {
    pub fn new(policy: &'a HeaderPolicy) -> Self {
        Self {
            policy,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: &'a dyn PiiMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Return a redacted copy of `headers`. The input is not modified.
    pub fn redact(&self, headers: &HeaderCollection) -> HeaderCollection {
        if headers.is_empty() {
            return headers.clone();
        }

        let mut redacted = headers.clone();
        let mut scrambled = 0usize;
        let mut marked = 0usize;

        for name in headers.names() {
            if self.policy.is_scrambled(name) {
                redacted.map_values(name, |value| Pii::new(value).scrambled_value());
                scrambled += 1;
            } else if let Some(marker) = self.marker {
                if !self.policy.is_allowed(name) {
                    redacted.map_values(name, |value| marker.mark(&Pii::new(value)));
                    marked += 1;
                }
            }
        }

        log::debug!(
            "HEADERS_REDACTED headers={} scrambled={} marked={}",
            headers.len(),
            scrambled,
            marked
        );

        redacted
    }

    /// Scramble `headers` in place, ignoring any marker. Equivalent to
    /// replacing the contents with `redact` output of a marker-less redactor.
    ///
    /// The caller must not share `headers` with concurrent redaction calls.
    pub fn scramble_in_place(&self, headers: &mut HeaderCollection) {
        let scrubbed = HeaderRedactor::new(self.policy).redact(headers);
        headers.clear();
        headers.extend(scrubbed);
    }
}

impl std::fmt::Debug for HeaderRedactor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderRedactor")
            .field("policy", self.policy)
            .field("marker", &self.marker.is_some())
            .finish()
    }
}

/// Redact `headers` with the process-wide policy.
pub fn redact_headers(headers: &HeaderCollection, marker: Option<&dyn PiiMarker>) -> HeaderCollection {
    let redactor = HeaderRedactor::default();
    match marker {
        Some(marker) => redactor.with_marker(marker).redact(headers),
        None => redactor.redact(headers),
    }
}

/// Scramble `headers` in place with the process-wide policy.
pub fn scramble_headers(headers: &mut HeaderCollection) {
    HeaderRedactor::default().scramble_in_place(headers);
}

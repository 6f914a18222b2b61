//! Header source adapters.
//!
//! Brings header-bearing types into the canonical name → ordered values
//! shape the redactor works on, and exposes lookups for the well-known
//! correlation headers.

use std::collections::HashMap;

use crate::security::headers::HeaderCollection;

pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
pub const REQUEST_ID: &str = "x-ms-request-id";
pub const CORRELATION_REQUEST_ID: &str = "x-ms-correlation-request-id";

/// Anything that carries HTTP-style headers.
pub trait HeaderSource {
    /// All values of `name`, in order. Empty when the header is missing.
    fn header_values(&self, name: &str) -> Vec<String>;

    /// Canonical copy of every header.
    fn to_header_collection(&self) -> HeaderCollection;

    fn first_header_value(&self, name: &str) -> Option<String> {
        self.header_values(name).into_iter().next()
    }
}

impl HeaderSource for HeaderCollection {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.get(name).map(|v| v.to_vec()).unwrap_or_default()
    }

    fn to_header_collection(&self) -> HeaderCollection {
        self.clone()
    }

    fn first_header_value(&self, name: &str) -> Option<String> {
        self.first(name).map(str::to_string)
    }
}

/// Outgoing request and incoming response headers. Non-UTF-8 bytes are
/// replaced lossily.
impl HeaderSource for http::HeaderMap {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect()
    }

    fn to_header_collection(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::new();
        for (name, value) in self.iter() {
            headers.append(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        headers
    }
}

impl<B> HeaderSource for http::Request<B> {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.headers().header_values(name)
    }

    fn to_header_collection(&self) -> HeaderCollection {
        self.headers().to_header_collection()
    }
}

impl<B> HeaderSource for http::Response<B> {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.headers().header_values(name)
    }

    fn to_header_collection(&self) -> HeaderCollection {
        self.headers().to_header_collection()
    }
}

/// Entries ordered by key bytes, so case variants merge the same way on
/// every run.
fn sorted_entries(dict: &HashMap<String, Vec<String>>) -> Vec<(&String, &Vec<String>)> {
    let mut entries: Vec<_> = dict.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Framework request-header dictionaries. Keys that differ only by case are
/// merged, values appended in byte order of the keys.
impl HeaderSource for HashMap<String, Vec<String>> {
    fn header_values(&self, name: &str) -> Vec<String> {
        sorted_entries(self)
            .into_iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().cloned())
            .collect()
    }

    fn to_header_collection(&self) -> HeaderCollection {
        sorted_entries(self)
            .into_iter()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect()
    }
}

/// First `x-ms-client-request-id` value, `None` if missing or no source.
pub fn client_request_id<S: HeaderSource + ?Sized>(source: Option<&S>) -> Option<String> {
    source.and_then(|s| s.first_header_value(CLIENT_REQUEST_ID))
}

/// First `x-ms-request-id` value, `None` if missing or no source.
pub fn request_id<S: HeaderSource + ?Sized>(source: Option<&S>) -> Option<String> {
    source.and_then(|s| s.first_header_value(REQUEST_ID))
}

/// First `x-ms-correlation-request-id` value, `None` if missing or no source.
pub fn correlation_request_id<S: HeaderSource + ?Sized>(source: Option<&S>) -> Option<String> {
    source.and_then(|s| s.first_header_value(CORRELATION_REQUEST_ID))
}

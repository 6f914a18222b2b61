//! Case-insensitive header collection.
//!
//! Header names compare with ASCII case folding, never locale rules. The
//! first spelling seen for a name is kept for output, and entries keep their
//! insertion order.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// Mapping from header name to an ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<HeaderEntry>,
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].values.as_slice())
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(|s| s.as_str())
    }

    /// Replace the values stored under `name`. An existing entry keeps its
    /// spelling and position.
    pub fn insert<I, V>(&mut self, name: &str, values: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.position(name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].values, values)),
            None => {
                self.entries.push(HeaderEntry {
                    name: name.to_string(),
                    values,
                });
                None
            }
        }
    }

    /// Add one value after any existing values of `name`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(i) => self.entries[i].values.push(value.into()),
            None => self.entries.push(HeaderEntry {
                name: name.to_string(),
                values: vec![value.into()],
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|i| self.entries.remove(i).values)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.values.as_slice()))
    }

    /// Rewrite every value stored under `name` through `f`.
    pub(crate) fn map_values<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(i) = self.position(name) {
            for value in self.entries[i].values.iter_mut() {
                *value = f(value);
            }
        }
    }
}

impl<V: Into<String>> FromIterator<(String, Vec<V>)> for HeaderCollection {
    fn from_iter<T: IntoIterator<Item = (String, Vec<V>)>>(iter: T) -> Self {
        let mut headers = HeaderCollection::new();
        headers.extend(iter);
        headers
    }
}

/// Names differing only by case are merged, values appended in order.
impl<V: Into<String>> Extend<(String, Vec<V>)> for HeaderCollection {
    fn extend<T: IntoIterator<Item = (String, Vec<V>)>>(&mut self, iter: T) {
        for (name, values) in iter {
            if values.is_empty() && !self.contains(&name) {
                self.insert(&name, Vec::<String>::new());
            }
            for value in values {
                self.append(&name, value);
            }
        }
    }
}

impl IntoIterator for HeaderCollection {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(|e| (e.name, e.values))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl Serialize for HeaderCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderCollection::new();
        headers.insert("Authorization", ["Bearer x"]);
        assert_eq!(headers.first("authorization"), Some("Bearer x"));
        assert_eq!(headers.first("AUTHORIZATION"), Some("Bearer x"));
        assert!(headers.contains("AuThOrIzAtIoN"));
    }

    #[test]
    fn test_insert_keeps_first_spelling() {
        let mut headers = HeaderCollection::new();
        headers.insert("Content-Type", ["text/plain"]);
        let old = headers.insert("content-type", ["application/json"]);
        assert_eq!(old, Some(vec!["text/plain".to_string()]));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["Content-Type"]);
        assert_eq!(headers.first("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_from_iter_merges_case_variants() {
        let headers: HeaderCollection = vec![
            ("Accept".to_string(), vec!["a"]),
            ("accept".to_string(), vec!["b"]),
            ("Host".to_string(), vec!["example.com"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("ACCEPT").unwrap(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut headers = HeaderCollection::new();
        headers.append("B", "1");
        headers.append("A", "2");
        headers.append("b", "3");
        let names: Vec<&str> = headers.names().collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut headers = HeaderCollection::new();
        headers.append("X-One", "1");
        headers.append("X-Two", "2");
        assert_eq!(headers.remove("x-one"), Some(vec!["1".to_string()]));
        assert!(!headers.contains("X-One"));
        headers.clear();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_serializes_as_map() {
        let mut headers = HeaderCollection::new();
        headers.insert("Accept", ["*/*"]);
        assert_eq!(
            serde_json::to_string(&headers).unwrap(),
            r#"{"Accept":["*/*"]}"#
        );
    }
}

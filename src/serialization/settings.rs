//! Per-call serializer settings.

use std::collections::{HashMap, HashSet};

/// Default container nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// What to do when a member refers back to a value already being serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleHandling {
    /// Omit the member.
    #[default]
    Ignore,
    /// Fail the serialization.
    Error,
    /// Serialize it again; only the depth limit stops the descent.
    Serialize,
}

/// Field names to skip, keyed by the serialized type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIgnores {
    by_type: HashMap<String, HashSet<String>>,
}

impl FieldIgnores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, type_name: &str, field: &str) {
        self.by_type
            .entry(type_name.to_string())
            .or_default()
            .insert(field.to_string());
    }

    pub fn is_ignored(&self, type_name: &str, field: &str) -> bool {
        self.by_type
            .get(type_name)
            .map(|fields| fields.contains(field))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerSettings {
    pub max_depth: usize,
    pub cycle_handling: CycleHandling,
    pub ignores: FieldIgnores,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cycle_handling: CycleHandling::Ignore,
            ignores: FieldIgnores::new(),
        }
    }
}

impl SerializerSettings {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_handling(mut self, cycle_handling: CycleHandling) -> Self {
        self.cycle_handling = cycle_handling;
        self
    }

    pub fn ignore(mut self, type_name: &str, field: &str) -> Self {
        self.ignores.add(type_name, field);
        self
    }
}

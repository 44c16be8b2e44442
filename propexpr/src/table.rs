//! In-memory property store.
//!
//! The reference store behind [`PropertySource`]; hosts with their own data
//! model implement the trait directly instead.

use std::collections::HashMap;

use crate::expr::PropertySource;
use crate::value::Value;

/// Named property table backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct PropertyTable {
    props: HashMap<String, Value>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a property.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.props.insert(name.into(), value.into());
    }

    /// Get a property, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// Remove a property.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.props.remove(name).is_some()
    }

    /// Returns `true` if the property is set.
    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Iterate over all properties, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl PropertySource for PropertyTable {
    fn names(&self) -> Vec<String> {
        self.props.keys().cloned().collect()
    }

    fn read(&self, name: &str) -> Value {
        self.props.get(name).cloned().unwrap_or_default()
    }

    fn write(&mut self, name: &str, value: Value) {
        self.props.insert(name.to_owned(), value);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Document-global variable table

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered `name -> value` map built from `@name = value` declarations.
///
/// A later declaration overwrites the value of an earlier one but keeps the
/// position where the name was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableTable(IndexMap<String, String>);

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay another table; its values win
    pub fn merge(&mut self, other: &VariableTable) {
        for (name, value) in other.iter() {
            self.declare(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = VariableTable::new();
        for (k, v) in iter {
            table.declare(k, v);
        }
        table
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for VariableTable {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.declare(k, v);
        }
    }
}

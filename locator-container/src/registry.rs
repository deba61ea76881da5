//! Local value registry: the id→value storage of one container.
//!
//! The registry keeps entries in insertion order. It knows nothing about
//! delegates; the [`Container`](crate::Container) layers master-delegate
//! precedence on top of it.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::value::Value;

/// Stores the entries owned by a single container.
#[derive(Debug)]
pub(crate) struct Registry {
    entries: IndexMap<String, Value>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Stores `value` under `id`, returning the entry it replaced.
    ///
    /// An existing entry keeps its position in iteration order.
    pub fn insert(&mut self, id: String, value: Value) -> Option<Value> {
        debug!(id = %id, type_name = value.type_name(), "Stored value");
        self.entries.insert(id, value)
    }

    /// Looks up a value by id.
    pub fn get(&self, id: &str) -> Option<&Value> {
        trace!(id, "Local lookup");
        self.entries.get(id)
    }

    /// Returns `true` if `id` is stored locally.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Removes an entry, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Value> {
        let removed = self.entries.shift_remove(id);
        if removed.is_some() {
            debug!(id, "Removed value");
        }
        removed
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns stored ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns a snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect()
    }
}

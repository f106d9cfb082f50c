//! Key/value table keyed by interned strings.
//!
//! Because strings are interned, handle identity is content identity, so the
//! handle itself is the key.

use core_types::{ObjRef, Value};
use rustc_hash::FxHashMap;

/// Name to value bindings (used for globals)
#[derive(Debug, Default, Clone)]
pub struct Table {
    entries: FxHashMap<ObjRef, Value>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `value`. Returns true when the key was not bound before.
    pub fn set(&mut self, key: ObjRef, value: Value) -> bool {
        self.entries.insert(key, value).is_none()
    }

    /// Value bound to `key`
    pub fn get(&self, key: ObjRef) -> Option<Value> {
        self.entries.get(&key).copied()
    }

    /// Remove a binding. Returns true when one existed.
    pub fn remove(&mut self, key: ObjRef) -> bool {
        self.entries.remove(&key).is_some()
    }

    /// Returns true when `key` is bound
    pub fn contains(&self, key: ObjRef) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over bindings in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (ObjRef, Value)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}

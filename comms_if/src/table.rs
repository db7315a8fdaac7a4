//! # Publication table
//!
//! A string keyed store of the latest value published by each producer. Sensors (real or
//! simulated) publish their frames into it, the control modules publish their debug values into
//! it, and the operator tuning surface edits values in it.
//!
//! Keys are hierarchical, separated by `/`. A [`Table`] handle may be scoped to a prefix with
//! [`Table::sub_table`], in which case all keys passed to it are relative to that prefix. All
//! handles cloned or scoped from the same root share the same underlying storage.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Separator between the levels of a key.
pub const KEY_SEP: char = '/';

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to a shared publication table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: Arc<RwLock<BTreeMap<String, Entry>>>,

    /// Prefix applied to every key used through this handle, empty for the root.
    prefix: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single value in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Bool(bool),
    Number(f64),
    NumberArray(Vec<f64>),
    String(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Table {
    /// Create a new, empty, root table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle scoped to `name` below this handle's prefix.
    pub fn sub_table(&self, name: &str) -> Self {
        Self {
            entries: self.entries.clone(),
            prefix: self.full_key(name),
        }
    }

    /// The prefix of this handle, empty for the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Publish an entry, replacing any previous value under the key.
    pub fn put(&self, key: &str, entry: Entry) {
        let key = self.full_key(key);
        self.write().insert(key, entry);
    }

    pub fn put_bool(&self, key: &str, value: bool) {
        self.put(key, Entry::Bool(value))
    }

    pub fn put_number(&self, key: &str, value: f64) {
        self.put(key, Entry::Number(value))
    }

    pub fn put_number_array(&self, key: &str, value: &[f64]) {
        self.put(key, Entry::NumberArray(value.to_vec()))
    }

    pub fn put_string<S: Into<String>>(&self, key: &str, value: S) {
        self.put(key, Entry::String(value.into()))
    }

    /// Get a copy of the entry under the key.
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.read().get(&self.full_key(key)).cloned()
    }

    /// Get a boolean, or `None` if the key is missing or holds another type.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.read().get(&self.full_key(key)) {
            Some(Entry::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a number, or `None` if the key is missing or holds another type.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.read().get(&self.full_key(key)) {
            Some(Entry::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get a number, returning `default` if the key is missing or holds another type.
    pub fn get_number_or(&self, key: &str, default: f64) -> f64 {
        self.get_number(key).unwrap_or(default)
    }

    pub fn get_number_array(&self, key: &str) -> Option<Vec<f64>> {
        match self.read().get(&self.full_key(key)) {
            Some(Entry::NumberArray(a)) => Some(a.clone()),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.read().get(&self.full_key(key)) {
            Some(Entry::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns true if the key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(&self.full_key(key))
    }

    /// Remove the entry under the key, returning it if it existed.
    pub fn remove(&self, key: &str) -> Option<Entry> {
        let key = self.full_key(key);
        self.write().remove(&key)
    }

    /// List the keys below this handle's prefix, relative to it.
    pub fn keys(&self) -> Vec<String> {
        self.read()
            .keys()
            .filter_map(|k| self.strip_prefix(k).map(String::from))
            .collect()
    }

    /// Copy every entry below this handle's prefix, keyed by the full key.
    pub fn snapshot(&self) -> BTreeMap<String, Entry> {
        self.read()
            .iter()
            .filter(|(k, _)| self.strip_prefix(k).is_some())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // --------------------------------------------------------------------------------------------
    // PRIVATE
    // --------------------------------------------------------------------------------------------

    fn full_key(&self, key: &str) -> String {
        let key = key.trim_matches(KEY_SEP);

        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.prefix, KEY_SEP, key)
        }
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(key);
        }

        key.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(KEY_SEP))
    }

    // A panic in another publisher can't leave a map insert half done, so a poisoned lock is
    // still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

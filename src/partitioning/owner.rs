//! Owners: named storage units placed on the ring.
//!
//! An owner holds an exclusively-owned map of string keys to opaque values.
//! It has no eviction, no size bound and no TTL; placement and migration are
//! decided by the ring and the cache, never by the owner itself.

use crate::error::{Error, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// A named key/value store attached to the ring.
///
/// Identity is the name: two owners are equal when their names are equal,
/// regardless of what they store.
pub struct Owner<V = Bytes> {
    /// Unique, non-blank identity.
    name: String,

    /// Stored entries.
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Owner<V> {
    /// Create an empty owner.
    ///
    /// Fails with [`Error::InvalidIdentity`] if the name is empty or blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidIdentity(name));
        }

        Ok(Self {
            name,
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// The owner's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a value, returning the one it replaced.
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.write().insert(key.into(), value)
    }

    /// Remove a key. Returns true if it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Remove and return every entry whose key matches `pred`.
    ///
    /// The predicate runs under this owner's write lock, so it must not
    /// touch this owner again.
    pub fn extract_where<F>(&self, mut pred: F) -> Vec<(String, V)>
    where
        F: FnMut(&str) -> bool,
    {
        let mut entries = self.entries.write();
        let matching: Vec<String> = entries.keys().filter(|k| pred(k)).cloned().collect();

        matching
            .into_iter()
            .filter_map(|key| entries.remove(&key).map(|value| (key, value)))
            .collect()
    }

    /// Bulk-write entries, overwriting existing keys.
    pub fn extend<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, V)>,
    {
        self.entries.write().extend(entries);
    }
}

impl<V: Clone> Owner<V> {
    /// Get a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Copy of the whole store.
    pub fn snapshot(&self) -> HashMap<String, V> {
        self.entries.read().clone()
    }
}

impl<V> PartialEq for Owner<V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<V> Eq for Owner<V> {}

impl<V> fmt::Debug for Owner<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("name", &self.name)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(Owner::<String>::new(""), Err(Error::InvalidIdentity(_))));
        assert!(matches!(Owner::<String>::new("   "), Err(Error::InvalidIdentity(_))));
        assert!(Owner::<String>::new("node0").is_ok());
    }

    #[test]
    fn test_set_get_delete() {
        let owner = Owner::new("node0").unwrap();

        assert_eq!(owner.set("k", "v1".to_string()), None);
        assert_eq!(owner.get("k"), Some("v1".to_string()));

        // Overwrite
        assert_eq!(owner.set("k", "v2".to_string()), Some("v1".to_string()));
        assert_eq!(owner.get("k"), Some("v2".to_string()));
        assert_eq!(owner.len(), 1);

        assert!(owner.delete("k"));
        assert!(!owner.delete("k"));
        assert_eq!(owner.get("k"), None);
        assert!(owner.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let owner = Owner::new("node0").unwrap();
        owner.set("a", Bytes::from_static(b"1"));

        let snapshot = owner.snapshot();
        owner.set("b", Bytes::from_static(b"2"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(owner.len(), 2);
    }

    #[test]
    fn test_extract_where() {
        let owner = Owner::new("node0").unwrap();
        for i in 0..6 {
            owner.set(format!("key{}", i), i);
        }

        let mut extracted = owner.extract_where(|k| k.ends_with('1') || k.ends_with('4'));
        extracted.sort();

        assert_eq!(extracted, vec![("key1".to_string(), 1), ("key4".to_string(), 4)]);
        assert_eq!(owner.len(), 4);
        assert!(!owner.contains("key1"));
        assert!(owner.contains("key0"));
    }

    #[test]
    fn test_extend_overwrites() {
        let owner = Owner::new("node0").unwrap();
        owner.set("a", 1);
        owner.extend(vec![("a".to_string(), 10), ("b".to_string(), 2)]);

        assert_eq!(owner.get("a"), Some(10));
        assert_eq!(owner.get("b"), Some(2));
    }

    #[test]
    fn test_identity_equality() {
        let a1 = Owner::<u32>::new("a").unwrap();
        let a2 = Owner::<u32>::new("a").unwrap();
        let b = Owner::<u32>::new("b").unwrap();
        a1.set("x", 1);

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }
}

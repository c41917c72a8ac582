//! Testing utilities for the ring cache.
//!
//! This module provides fixtures and scenario suites that exercise the cache
//! across membership changes:
//! - A model-checked cache fixture that remembers every write
//! - Placement snapshots for comparing owners before and after a change
//! - Seeded random key sets so failures reproduce
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 TestCache                    │
//! │  cache: DistributedCache<String>             │
//! │  model: key -> value written                 │
//! │                                              │
//! │  assert_consistent():                        │
//! │    every model key readable                  │
//! │    every key stored on its resolved owner    │
//! │    no stray keys on any owner                │
//! └─────────────────────────────────────────────┘
//! ```

mod utils;

pub(crate) use utils::{placement, random_keys, sequential_keys, Placement};

use crate::cache::DistributedCache;
use crate::config::CacheConfig;
use crate::partitioning::Owner;
use crate::types::{AddOwnerOutcome, RemoveOwnerOutcome};
use std::collections::HashMap;

/// A cache paired with a model of what it should contain.
pub(crate) struct TestCache {
    pub cache: DistributedCache<String>,
    pub model: HashMap<String, String>,
}

impl TestCache {
    /// Create a cache with the given owners and positions per owner.
    pub fn new(owners: &[&str], virtual_nodes: usize) -> Self {
        let owners = owners.iter().map(|name| Owner::new(*name).unwrap());
        let config = CacheConfig::new().with_virtual_nodes(virtual_nodes);
        Self {
            cache: DistributedCache::with_owners(config, owners).unwrap(),
            model: HashMap::new(),
        }
    }

    /// Write `key` with a value derived from it.
    pub fn write(&mut self, key: &str) {
        let value = format!("value-of-{}", key);
        self.cache.set(key, value.clone()).unwrap();
        self.model.insert(key.to_string(), value);
    }

    pub fn write_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a String>) {
        for key in keys {
            self.write(key);
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.model.remove(key);
        self.cache.delete(key)
    }

    pub fn add(&self, name: &str) -> AddOwnerOutcome {
        self.cache.add_owner(Owner::new(name).unwrap())
    }

    pub fn leave(&self, name: &str) -> RemoveOwnerOutcome {
        self.cache.remove_owner(name)
    }

    /// Where each model key currently resolves.
    pub fn placement(&self) -> Placement {
        placement(&self.cache, self.model.keys())
    }

    /// Check the cache against the model.
    pub fn assert_consistent(&self) {
        let mut stored = 0;
        for owner in self.cache.owners() {
            let contents = self.cache.owner_contents(&owner).unwrap();
            for key in contents.keys() {
                assert_eq!(
                    self.cache.owner_of(key).as_deref(),
                    Some(owner.as_str()),
                    "key {} stored on {} but resolves elsewhere",
                    key,
                    owner
                );
                assert!(self.model.contains_key(key), "stray key {} on {}", key, owner);
            }
            stored += contents.len();
        }
        assert_eq!(stored, self.model.len(), "stored key count differs from model");

        for (key, value) in &self.model {
            assert_eq!(self.cache.get(key).as_ref(), Some(value), "key {} lost", key);
        }
    }
}

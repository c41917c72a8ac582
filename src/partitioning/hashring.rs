//! Consistent hashing implementation with virtual positions.
//!
//! Each owner is placed on a `u64` ring at several virtual positions derived
//! from `hash(name + ":" + index)`. A key belongs to the owner at the first
//! position greater than or equal to the key's hash, wrapping around to the
//! lowest position when no such position exists.

use crate::error::{Error, Result};
use crate::partitioning::owner::Owner;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;
use tracing::{debug, warn};
use twox_hash::XxHash64;

/// Number of virtual positions per owner.
pub const DEFAULT_VIRTUAL_NODES: usize = 3;

/// A consistent hash ring of owners.
///
/// The ring does not enforce unique identities; callers check membership
/// before adding. It never moves data either: removing an owner only hands
/// back a copy of its store.
pub struct HashRing<V = Bytes> {
    /// Virtual positions mapped to their owning owner, sorted by position.
    positions: BTreeMap<u64, Arc<Owner<V>>>,

    /// Attached owners by name.
    owners: BTreeMap<String, Arc<Owner<V>>>,

    /// Number of virtual positions per owner.
    virtual_nodes: usize,
}

impl<V> HashRing<V> {
    /// Create an empty ring.
    ///
    /// Every owner needs at least one position, so `0` is raised to `1`.
    /// [`CacheConfig::validate`](crate::CacheConfig::validate) rejects `0`
    /// before a cache ever builds its ring; the clamp only matters for rings
    /// built directly.
    pub fn new(virtual_nodes: usize) -> Self {
        Self {
            positions: BTreeMap::new(),
            owners: BTreeMap::new(),
            virtual_nodes: virtual_nodes.max(1),
        }
    }

    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }

    /// Number of occupied positions on the ring.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of attached owners.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// True when no position is occupied.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains_owner(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    /// Look up an attached owner by name.
    pub fn get_owner(&self, name: &str) -> Option<&Arc<Owner<V>>> {
        self.owners.get(name)
    }

    /// Attached owners, ordered by name.
    pub fn owners(&self) -> impl Iterator<Item = &Arc<Owner<V>>> {
        self.owners.values()
    }

    /// Names of the attached owners, sorted.
    pub fn owner_names(&self) -> Vec<String> {
        self.owners.keys().cloned().collect()
    }

    /// Number of positions currently held by `name`.
    pub fn positions_of(&self, name: &str) -> usize {
        self.positions
            .values()
            .filter(|owner| owner.name() == name)
            .count()
    }

    /// Attach an owner at its virtual positions.
    ///
    /// Returns how many positions were newly occupied. A position already
    /// held by another owner is overwritten (last write wins) and reported.
    pub fn add_owner(&mut self, owner: Arc<Owner<V>>) -> usize {
        let name = owner.name().to_string();
        let mut inserted = 0;

        for i in 0..self.virtual_nodes {
            let position = Self::position_hash(&name, i);
            match self.positions.insert(position, owner.clone()) {
                None => inserted += 1,
                Some(previous) if previous.name() != name => {
                    warn!(
                        position,
                        previous = previous.name(),
                        owner = %name,
                        "Virtual position collision, previous occupant overwritten"
                    );
                }
                Some(_) => {}
            }
        }

        self.owners.insert(name.clone(), owner);
        debug!(owner = %name, inserted, positions = self.positions.len(), "Added owner to ring");
        inserted
    }

    /// Detach an owner and drop the positions it still holds.
    ///
    /// Returns the detached owner, or `None` if no owner by that name is
    /// attached. Positions that another owner won by collision are left alone.
    pub fn detach_owner(&mut self, name: &str) -> Option<Arc<Owner<V>>> {
        let owner = self.owners.remove(name)?;

        let mut removed = 0;
        for i in 0..self.virtual_nodes {
            let position = Self::position_hash(name, i);
            if self
                .positions
                .get(&position)
                .is_some_and(|occupant| occupant.name() == name)
            {
                self.positions.remove(&position);
                removed += 1;
            }
        }

        debug!(owner = %name, removed, positions = self.positions.len(), "Removed owner from ring");
        Some(owner)
    }

    /// Get the owner responsible for a key.
    ///
    /// Returns `None` if the ring is empty.
    pub fn owner(&self, key: &str) -> Option<&Arc<Owner<V>>> {
        self.owner_at(Self::hash_key(key.as_bytes()))
    }

    /// Name of the owner responsible for a key.
    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.owner(key).map(|owner| owner.name())
    }

    /// Write a value into the owner currently responsible for `key`.
    ///
    /// Fails with [`Error::NoOwnersAvailable`] if the ring is empty.
    pub fn place(&self, key: impl Into<String>, value: V) -> Result<&Arc<Owner<V>>> {
        let key = key.into();
        let owner = self.owner(&key).ok_or(Error::NoOwnersAvailable)?;
        owner.set(key, value);
        Ok(owner)
    }

    /// Get the owner at or after a specific position, wrapping around.
    pub fn owner_at(&self, hash: u64) -> Option<&Arc<Owner<V>>> {
        self.positions
            .range(hash..)
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, owner)| owner)
    }

    /// Sample the keyspace and count how many sample keys land on each owner.
    ///
    /// This is useful for testing/monitoring placement quality.
    pub fn get_distribution(&self, sample_size: usize) -> HashMap<String, usize> {
        let mut distribution = HashMap::new();

        for i in 0..sample_size {
            let key = format!("sample_key_{}", i);
            if let Some(owner) = self.owner_of(&key) {
                *distribution.entry(owner.to_string()).or_insert(0) += 1;
            }
        }

        distribution
    }

    /// Ring position of an owner's `index`-th virtual position.
    pub fn position_hash(name: &str, index: usize) -> u64 {
        Self::hash_key(format!("{}:{}", name, index).as_bytes())
    }

    /// Calculate the hash of a key using xxHash64.
    pub fn hash_key(key: &[u8]) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(key);
        hasher.finish()
    }
}

impl<V: Clone> HashRing<V> {
    /// Detach an owner and return a copy of its store.
    ///
    /// No data is migrated; the caller re-places the returned entries.
    pub fn remove_owner(&mut self, name: &str) -> Option<HashMap<String, V>> {
        self.detach_owner(name).map(|owner| owner.snapshot())
    }
}

impl<V> Default for HashRing<V> {
    fn default() -> Self {
        Self::new(DEFAULT_VIRTUAL_NODES)
    }
}

impl<V> fmt::Debug for HashRing<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("owners", &self.owners.keys().collect::<Vec<_>>())
            .field("positions", &self.positions.len())
            .field("virtual_nodes", &self.virtual_nodes)
            .finish()
    }
}

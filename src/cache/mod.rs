//! Ring cache implementation.

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::metrics::CacheMetrics;
use crate::partitioning::{HashRing, Owner};
use crate::rebalancing::{RebalanceCoordinator, RebalanceReport};
use crate::types::{AddOwnerOutcome, CacheStats, RemoveOwnerOutcome};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The main cache instance.
///
/// Routes every key to the owner the ring assigns it, and migrates keys when
/// owners join or leave. The cache stores nothing itself; all data lives in
/// the owners.
///
/// # Concurrency
///
/// The ring sits behind a single reader/writer lock. `get`, `set`, `delete`
/// and the introspection calls share the read lock and run concurrently,
/// each owner guarding its own store. `add_owner` and `remove_owner` hold
/// the write lock for the topology change and the whole migration, so no
/// request ever sees a half-migrated ring.
pub struct DistributedCache<V = Bytes> {
    /// The consistent hash ring holding all owners.
    ring: RwLock<HashRing<V>>,

    /// Migration driver and history.
    rebalancer: RebalanceCoordinator,

    /// Request and rebalance metrics.
    metrics: CacheMetrics,

    /// Configuration.
    config: CacheConfig,
}

impl<V: Clone> DistributedCache<V> {
    /// Create an empty cache. Writes fail until an owner is added.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        info!(virtual_nodes = config.virtual_nodes, "Creating ring cache");

        Ok(Self {
            ring: RwLock::new(HashRing::new(config.virtual_nodes)),
            rebalancer: RebalanceCoordinator::default(),
            metrics: CacheMetrics::new(),
            config,
        })
    }

    /// Create a cache with an initial set of owners.
    ///
    /// Fails with [`Error::AlreadyExists`] if two owners share a name.
    pub fn with_owners<I>(config: CacheConfig, owners: I) -> Result<Self>
    where
        I: IntoIterator<Item = Owner<V>>,
    {
        let cache = Self::new(config)?;
        for owner in owners {
            let name = owner.name().to_string();
            if let AddOwnerOutcome::AlreadyExists = cache.add_owner(owner) {
                return Err(Error::AlreadyExists(name));
            }
        }
        Ok(cache)
    }

    /// Get the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store a value on the owner responsible for `key`, overwriting any
    /// previous value.
    ///
    /// Fails with [`Error::NoOwnersAvailable`] if no owner is attached.
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.set_located(key, value).map(|_| ())
    }

    /// Like [`set`](Self::set), but returns the name of the owner that
    /// stored the value.
    pub fn set_located(&self, key: impl Into<String>, value: V) -> Result<String> {
        let ring = self.ring.read();
        let result = ring.place(key, value).map(|owner| owner.name().to_string());
        self.metrics.record_set(result.is_ok());
        result
    }

    /// Get the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or no owner is attached.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.ring.read().owner(key).and_then(|owner| owner.get(key));
        self.metrics.record_get(value.is_some());
        value
    }

    /// Remove `key` from its owner. Returns true if it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.metrics.record_delete();
        self.ring
            .read()
            .owner(key)
            .is_some_and(|owner| owner.delete(key))
    }

    /// Attach an owner and move onto it every key it now owns.
    ///
    /// If an owner with the same name is already attached, nothing changes
    /// and [`AddOwnerOutcome::AlreadyExists`] is returned. Entries the owner
    /// already holds are routed to whichever owner the ring assigns them;
    /// `migrated` counts them along with the keys moved onto the owner.
    pub fn add_owner(&self, owner: Owner<V>) -> AddOwnerOutcome {
        let mut ring = self.ring.write();

        if ring.contains_owner(owner.name()) {
            warn!(owner = owner.name(), "Owner already attached, ignoring add");
            return AddOwnerOutcome::AlreadyExists;
        }

        let owner = Arc::new(owner);
        ring.add_owner(owner.clone());

        let report = self.rebalancer.rebalance_on_join(&ring, &owner);
        self.metrics.record_rebalance(report.moved, 0);
        self.metrics
            .update_ring(ring.owner_count(), ring.position_count());

        info!(
            owner = owner.name(),
            migrated = report.moved,
            owners = ring.owner_count(),
            "Owner added"
        );

        AddOwnerOutcome::Added {
            migrated: report.moved,
        }
    }

    /// Create an owner named `name` and attach it.
    ///
    /// Fails with [`Error::InvalidIdentity`] if the name is empty or blank.
    pub fn add_owner_named(&self, name: impl Into<String>) -> Result<AddOwnerOutcome> {
        Ok(self.add_owner(Owner::new(name)?))
    }

    /// Detach an owner and re-place all of its keys on the remaining owners.
    ///
    /// If no owner by that name is attached, nothing changes and
    /// [`RemoveOwnerOutcome::NotFound`] is returned. Removing the last owner
    /// drops its keys; they are reported in `dropped`.
    pub fn remove_owner(&self, name: &str) -> RemoveOwnerOutcome {
        let mut ring = self.ring.write();

        let Some(data) = ring.remove_owner(name) else {
            warn!(owner = name, "Owner not attached, ignoring remove");
            return RemoveOwnerOutcome::NotFound;
        };

        let report = self.rebalancer.remigrate_on_leave(&ring, name, data);
        self.metrics.record_rebalance(report.moved, report.dropped);
        self.metrics
            .update_ring(ring.owner_count(), ring.position_count());

        info!(
            owner = name,
            remigrated = report.moved,
            dropped = report.dropped,
            owners = ring.owner_count(),
            "Owner removed"
        );

        RemoveOwnerOutcome::Removed {
            remigrated: report.moved,
            dropped: report.dropped,
        }
    }

    /// Name of the owner currently responsible for `key`.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.ring.read().owner_of(key).map(str::to_string)
    }

    /// Names of the attached owners, sorted.
    pub fn owners(&self) -> Vec<String> {
        self.ring.read().owner_names()
    }

    pub fn contains_owner(&self, name: &str) -> bool {
        self.ring.read().contains_owner(name)
    }

    /// Copy of everything an attached owner stores.
    ///
    /// Introspection only; returns `None` for an unknown owner.
    pub fn owner_contents(&self, name: &str) -> Option<HashMap<String, V>> {
        let contents = self.ring.read().get_owner(name).map(|owner| owner.snapshot());
        debug!(owner = name, found = contents.is_some(), "Owner contents requested");
        contents
    }

    /// Number of keys held by each attached owner.
    pub fn distribution(&self) -> BTreeMap<String, usize> {
        self.ring
            .read()
            .owners()
            .map(|owner| (owner.name().to_string(), owner.len()))
            .collect()
    }

    /// Total number of keys across all owners.
    pub fn len(&self) -> usize {
        self.ring.read().owners().map(|owner| owner.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let ring = self.ring.read();
        let snapshot = self.metrics.snapshot();

        CacheStats {
            owner_count: ring.owner_count(),
            position_count: ring.position_count(),
            virtual_nodes: ring.virtual_nodes(),
            entry_count: ring.owners().map(|owner| owner.len()).sum(),
            hits: snapshot.get_hits,
            misses: snapshot.get_misses,
            keys_migrated: snapshot.entries_moved,
        }
    }

    /// Get the metrics collector.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Recent rebalances, oldest first.
    pub fn rebalance_history(&self) -> Vec<RebalanceReport> {
        self.rebalancer.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(names: &[&str]) -> DistributedCache<String> {
        let owners = names.iter().map(|name| Owner::new(*name).unwrap());
        DistributedCache::with_owners(CacheConfig::default(), owners).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let cache = cache_with(&["node0", "node1", "node2"]);

        cache.set("key1", "value1".to_string()).unwrap();
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        cache.set("key1", "value2".to_string()).unwrap();
        assert_eq!(cache.get("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_value_lands_on_resolved_owner() {
        let cache = cache_with(&["node0", "node1", "node2"]);
        let owner = cache.set_located("user:42", "bob".to_string()).unwrap();

        assert_eq!(cache.owner_of("user:42"), Some(owner.clone()));
        let contents = cache.owner_contents(&owner).unwrap();
        assert_eq!(contents.get("user:42"), Some(&"bob".to_string()));
    }

    #[test]
    fn test_empty_ring_behaviour() {
        let cache: DistributedCache<String> = DistributedCache::new(CacheConfig::default()).unwrap();

        assert!(matches!(
            cache.set("key", "value".to_string()),
            Err(Error::NoOwnersAvailable)
        ));
        assert_eq!(cache.get("key"), None);
        assert!(!cache.delete("key"));
        assert_eq!(cache.owner_of("key"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_exactly_once() {
        let cache = cache_with(&["node0", "node1"]);
        cache.set("key", "value".to_string()).unwrap();

        assert!(cache.delete("key"));
        assert!(!cache.delete("key"));
        assert_eq!(cache.get("key"), None);
    }

    #[test]
    fn test_add_duplicate_owner_is_noop() {
        let cache = cache_with(&["node0", "node1"]);
        cache.set("key", "value".to_string()).unwrap();
        let positions = cache.stats().position_count;

        let outcome = cache.add_owner(Owner::new("node0").unwrap());

        assert_eq!(outcome, AddOwnerOutcome::AlreadyExists);
        assert_eq!(cache.stats().position_count, positions);
        assert_eq!(cache.get("key"), Some("value".to_string()));
    }

    #[test]
    fn test_add_preloaded_owner_keeps_entries_readable() {
        let cache = cache_with(&["node0", "node1"]);
        cache.set("existing", "e".to_string()).unwrap();

        let owner = Owner::new("node2").unwrap();
        for i in 0..20 {
            owner.set(format!("carried{}", i), i.to_string());
        }
        let outcome = cache.add_owner(owner);

        assert!(outcome.is_added());
        assert_eq!(cache.len(), 21);
        assert_eq!(cache.get("existing"), Some("e".to_string()));
        for i in 0..20 {
            let key = format!("carried{}", i);
            assert_eq!(cache.get(&key), Some(i.to_string()));
            let owner = cache.owner_of(&key).unwrap();
            assert!(cache.owner_contents(&owner).unwrap().contains_key(&key));
        }
    }

    #[test]
    fn test_remove_unknown_owner_is_noop() {
        let cache = cache_with(&["node0"]);
        cache.set("key", "value".to_string()).unwrap();

        assert_eq!(cache.remove_owner("node9"), RemoveOwnerOutcome::NotFound);
        assert_eq!(cache.owners(), vec!["node0"]);
        assert_eq!(cache.get("key"), Some("value".to_string()));
    }

    #[test]
    fn test_remove_last_owner_drops_keys() {
        let cache = cache_with(&["node0"]);
        cache.set("a", "1".to_string()).unwrap();
        cache.set("b", "2".to_string()).unwrap();

        let outcome = cache.remove_owner("node0");

        assert_eq!(
            outcome,
            RemoveOwnerOutcome::Removed {
                remigrated: 0,
                dropped: 2
            }
        );
        assert!(cache.owners().is_empty());
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.metrics().snapshot().entries_dropped, 2);
    }

    #[test]
    fn test_with_owners_rejects_duplicates() {
        let owners = vec![Owner::<String>::new("a").unwrap(), Owner::new("a").unwrap()];
        let result = DistributedCache::with_owners(CacheConfig::default(), owners);
        assert!(matches!(result, Err(Error::AlreadyExists(name)) if name == "a"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = DistributedCache::<String>::new(CacheConfig::new().with_virtual_nodes(0));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_add_owner_named() {
        let cache: DistributedCache<String> = DistributedCache::new(CacheConfig::default()).unwrap();

        assert!(matches!(cache.add_owner_named(""), Err(Error::InvalidIdentity(_))));
        assert_eq!(
            cache.add_owner_named("node0").unwrap(),
            AddOwnerOutcome::Added { migrated: 0 }
        );
        assert_eq!(
            cache.add_owner_named("node0").unwrap(),
            AddOwnerOutcome::AlreadyExists
        );
        assert!(cache.contains_owner("node0"));
    }

    #[test]
    fn test_owner_contents_unknown() {
        let cache = cache_with(&["node0"]);
        assert!(cache.owner_contents("node1").is_none());
        assert_eq!(cache.owner_contents("node0").map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_stats() {
        let cache = cache_with(&["node0", "node1", "node2"]);
        cache.set("a", "1".to_string()).unwrap();
        cache.get("a");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.owner_count, 3);
        assert_eq!(stats.position_count, 9);
        assert_eq!(stats.virtual_nodes, 3);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_default_value_type_is_bytes() {
        let cache: DistributedCache = DistributedCache::with_owners(
            CacheConfig::default(),
            [Owner::new("node0").unwrap()],
        )
        .unwrap();

        cache.set("blob", Bytes::from_static(b"\x00\x01")).unwrap();
        assert_eq!(cache.get("blob"), Some(Bytes::from_static(b"\x00\x01")));
    }

    #[test]
    fn test_rebalance_history_recorded() {
        let cache = cache_with(&["node0", "node1"]);
        cache.remove_owner("node1");

        // Two joins from construction plus one leave.
        assert_eq!(cache.rebalance_history().len(), 3);
    }
}

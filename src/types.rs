//! Core types used throughout the ring cache.

use serde::{Deserialize, Serialize};

/// Result of attaching an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOwnerOutcome {
    /// The owner joined the ring; `migrated` keys moved onto it.
    Added { migrated: usize },
    /// An owner with the same identity was already attached. Nothing changed.
    AlreadyExists,
}

impl AddOwnerOutcome {
    /// Check if the owner was attached by this call.
    pub fn is_added(&self) -> bool {
        matches!(self, AddOwnerOutcome::Added { .. })
    }
}

/// Result of detaching an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOwnerOutcome {
    /// The owner left the ring.
    ///
    /// `remigrated` keys were re-placed on the remaining owners; `dropped`
    /// keys were lost because no owner was left to take them.
    Removed { remigrated: usize, dropped: usize },
    /// No owner with this identity was attached. Nothing changed.
    NotFound,
}

impl RemoveOwnerOutcome {
    /// Check if the owner was detached by this call.
    pub fn is_removed(&self) -> bool {
        matches!(self, RemoveOwnerOutcome::Removed { .. })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of attached owners.
    pub owner_count: usize,
    /// Number of occupied ring positions.
    pub position_count: usize,
    /// Configured positions per owner.
    pub virtual_nodes: usize,
    /// Keys stored across all owners.
    pub entry_count: usize,
    /// Number of reads that found a value.
    pub hits: u64,
    /// Number of reads that found nothing.
    pub misses: u64,
    /// Keys moved by membership changes since startup.
    pub keys_migrated: u64,
}

impl CacheStats {
    /// Fraction of reads that found a value.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

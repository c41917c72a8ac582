//! In-process cache that places keys on owners with consistent hashing.
//!
//! This crate provides a cache whose data lives in a dynamic set of named
//! storage owners:
//! - **Consistent hashing** with several virtual positions per owner
//! - **Targeted rebalancing**: adding an owner moves only the keys it now owns
//! - **Remigration**: removing an owner re-places all of its keys
//! - **REST façade** and command-line client for the same call contract
//!
//! # Example
//!
//! ```rust
//! use ringcache::{AddOwnerOutcome, CacheConfig, DistributedCache, Owner};
//!
//! # fn main() -> ringcache::Result<()> {
//! let cache: DistributedCache<String> = DistributedCache::with_owners(
//!     CacheConfig::new().with_virtual_nodes(3),
//!     [Owner::new("node0")?, Owner::new("node1")?],
//! )?;
//!
//! cache.set("user:123", "Alice".to_string())?;
//! assert_eq!(cache.get("user:123"), Some("Alice".to_string()));
//!
//! // Only keys that now belong to node2 move.
//! let outcome = cache.add_owner(Owner::new("node2")?);
//! assert!(outcome.is_added());
//! assert_eq!(cache.get("user:123"), Some("Alice".to_string()));
//!
//! // node0's keys are re-placed on the remaining owners.
//! cache.remove_owner("node0");
//! assert_eq!(cache.get("user:123"), Some("Alice".to_string()));
//! assert!(cache.delete("user:123"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Application / HTTP façade         │
//! └─────────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────────┐
//! │          DistributedCache API               │
//! │  • get(key) -> Option<Value>                │
//! │  • set(key, value) -> Result<()>            │
//! │  • delete(key) -> bool                      │
//! │  • add_owner / remove_owner                 │
//! └─────────────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼───────────────┐
//!     ▼               ▼               ▼
//! ┌─────────┐   ┌──────────┐   ┌───────────┐
//! │HashRing │   │Rebalance │   │  Owners   │
//! │positions│   │Coordinator│  │ (storage) │
//! └─────────┘   └──────────┘   └───────────┘
//! ```
//!
//! # Consistency Model
//!
//! - **Placement**: for a fixed membership, a key always resolves to the same owner
//! - **Joins**: a key either stays where it is or moves to the joining owner
//! - **Leaves**: every key of the departing owner is re-placed, none stay behind
//! - **Topology changes** hold an exclusive lock; reads and writes share one

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod partitioning;
pub mod rebalancing;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use cache::DistributedCache;
pub use config::{CacheConfig, ServerConfig};
pub use error::{Error, NetworkError, Result};
pub use types::{AddOwnerOutcome, CacheStats, RemoveOwnerOutcome};

// Re-export partitioning types
pub use partitioning::{HashRing, Owner, DEFAULT_VIRTUAL_NODES};

// Re-export rebalancing types
pub use rebalancing::{RebalanceCoordinator, RebalanceReport, RebalanceType};

// Re-export metrics types
pub use metrics::{CacheMetrics, MetricsSnapshot};

// Re-export HTTP types
pub use network::{CacheClient, HttpServer};

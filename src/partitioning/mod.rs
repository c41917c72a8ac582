//! Partitioning module for placing keys on owners.
//!
//! This module implements consistent hashing for key placement, ensuring:
//! - Deterministic ownership for a fixed membership
//! - Minimal key redistribution when owners join/leave
//! - Smoother load through several virtual positions per owner
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        HashRing                              │
//! │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐   │
//! │  │ A:0 │→│ B:2 │→│ C:0 │→│ A:2 │→│ B:0 │→│ C:1 │→│ ... │   │
//! │  └─────┘ └─────┘ └─────┘ └─────┘ └─────┘ └─────┘ └─────┘   │
//! │        3 virtual positions per owner (configurable)         │
//! └─────────────────────────────────────────────────────────────┘
//!
//!  Key "user:123" → hash → first position >= hash → Owner B
//!                          (wraps to the lowest position past the end)
//! ```
//!
//! # Example
//!
//! ```rust
//! use ringcache::partitioning::{HashRing, Owner};
//! use std::sync::Arc;
//!
//! let mut ring: HashRing<String> = HashRing::new(3);
//! ring.add_owner(Arc::new(Owner::new("node0").unwrap()));
//! ring.add_owner(Arc::new(Owner::new("node1").unwrap()));
//!
//! let owner = ring.owner("user:123").unwrap().clone();
//! owner.set("user:123", "Alice".to_string());
//!
//! let data = ring.remove_owner(owner.name()).unwrap();
//! assert_eq!(data.len(), 1);
//! ```

mod hashring;
mod owner;

pub use hashring::{HashRing, DEFAULT_VIRTUAL_NODES};
pub use owner::Owner;

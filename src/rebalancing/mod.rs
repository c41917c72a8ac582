//! Rebalancing module for key migration during membership changes.
//!
//! The ring itself never moves data. After the cache changes the topology,
//! the coordinator moves exactly the keys whose owner changed.
//!
//! # Protocols
//!
//! ```text
//!  Owner joins                          Owner leaves
//!  ───────────                          ────────────
//!  1. attach owner to ring              1. detach owner, copy its store
//!  2. for every other owner:            2. for every (key, value) copied:
//!       re-resolve each key                  route through the shrunken
//!       owner == joined? extract             ring like a normal write
//!  3. bulk-write extracted keys         3. keys with nowhere to go are
//!     into the joined owner                dropped and counted
//! ```
//!
//! Both protocols run synchronously under the cache's topology write lock.
//! They are not atomic: keys already moved stay moved if a scan is cut short.

mod coordinator;
mod transfer;

pub use coordinator::{RebalanceCoordinator, RebalanceReport, RebalanceType, DEFAULT_MAX_HISTORY};
pub use transfer::{TransferBatch, TransferEntry};

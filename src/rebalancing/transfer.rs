//! Transfer types for moving entries between owners during rebalancing.

use crate::partitioning::Owner;

/// A cache entry being moved to a new owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry<V> {
    /// The cache key.
    pub key: String,

    /// The cache value.
    pub value: V,
}

impl<V> From<(String, V)> for TransferEntry<V> {
    fn from((key, value): (String, V)) -> Self {
        Self { key, value }
    }
}

/// Entries buffered for a single destination owner.
#[derive(Debug, Clone)]
pub struct TransferBatch<V> {
    /// Name of the owner receiving the entries.
    pub target: String,

    /// Entries in this batch.
    pub entries: Vec<TransferEntry<V>>,
}

impl<V> TransferBatch<V> {
    /// Create an empty batch for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            entries: Vec::new(),
        }
    }

    /// Get the number of entries in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bulk-write the batch into its destination, returning the entry count.
    pub fn apply(self, owner: &Owner<V>) -> usize {
        debug_assert_eq!(owner.name(), self.target);
        let count = self.entries.len();
        owner.extend(self.entries.into_iter().map(|e| (e.key, e.value)));
        count
    }
}

impl<V> Extend<(String, V)> for TransferBatch<V> {
    fn extend<I: IntoIterator<Item = (String, V)>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(TransferEntry::from));
    }
}

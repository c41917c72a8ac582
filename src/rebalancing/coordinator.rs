//! Rebalancing coordinator for membership changes.
//!
//! The coordinator runs the migration protocol after the ring topology has
//! changed and keeps a short history of what each rebalance moved.

use crate::partitioning::{HashRing, Owner};
use crate::rebalancing::transfer::TransferBatch;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Default number of reports kept in history.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Type of rebalancing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebalanceType {
    /// Owner joined the ring.
    OwnerJoin(String),
    /// Owner left the ring.
    OwnerLeave(String),
}

/// Summary of one completed rebalance.
#[derive(Debug, Clone)]
pub struct RebalanceReport {
    /// What triggered the rebalance.
    pub kind: RebalanceType,

    /// Keys written to a new owner.
    pub moved: usize,

    /// Keys that could not be placed because the ring was empty.
    pub dropped: usize,

    /// Keys taken from each source owner.
    pub sources: BTreeMap<String, usize>,

    /// Keys written to each destination owner.
    pub targets: BTreeMap<String, usize>,

    /// How long the migration took.
    pub duration: Duration,
}

impl RebalanceReport {
    fn new(kind: RebalanceType) -> Self {
        Self {
            kind,
            moved: 0,
            dropped: 0,
            sources: BTreeMap::new(),
            targets: BTreeMap::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Drives key migration and remembers recent rebalances.
#[derive(Debug)]
pub struct RebalanceCoordinator {
    /// Completed rebalances, oldest first.
    history: Mutex<VecDeque<RebalanceReport>>,

    /// Maximum history size.
    max_history: usize,
}

impl RebalanceCoordinator {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::new()),
            max_history,
        }
    }

    /// Move every key whose owner became `joined` onto it.
    ///
    /// `joined` must already be attached to `ring`. Every other owner's keys
    /// are re-resolved against the new topology; matching keys are removed
    /// from their current owner and buffered, then written into `joined` in
    /// one batch. Keys whose owner did not change are left untouched.
    ///
    /// Entries `joined` already held that resolve to another owner are
    /// routed there, so every key ends up readable.
    pub fn rebalance_on_join<V>(&self, ring: &HashRing<V>, joined: &Arc<Owner<V>>) -> RebalanceReport {
        let started = Instant::now();
        let target = joined.name();
        let mut report = RebalanceReport::new(RebalanceType::OwnerJoin(target.to_string()));
        let mut batch = TransferBatch::new(target);

        let strays = joined.extract_where(|key| ring.owner_of(key) != Some(target));
        if !strays.is_empty() {
            report.sources.insert(target.to_string(), strays.len());
            for (key, value) in strays {
                // The ring holds at least `joined`, so placement succeeds.
                if let Ok(owner) = ring.place(key, value) {
                    *report.targets.entry(owner.name().to_string()).or_insert(0) += 1;
                    report.moved += 1;
                }
            }
        }

        for source in ring.owners().filter(|owner| owner.name() != target) {
            let extracted = source.extract_where(|key| ring.owner_of(key) == Some(target));
            if !extracted.is_empty() {
                report.sources.insert(source.name().to_string(), extracted.len());
                batch.extend(extracted);
            }
        }

        let applied = batch.apply(joined);
        if applied > 0 {
            report.targets.insert(target.to_string(), applied);
        }
        report.moved += applied;
        report.duration = started.elapsed();

        info!(
            owner = %target,
            moved = report.moved,
            sources = report.sources.len(),
            "Rebalanced keys onto joining owner"
        );

        self.record(report.clone());
        report
    }

    /// Re-place the data of an owner that has already left the ring.
    ///
    /// Each entry is routed through the ring exactly like a normal write, so
    /// it lands on its new rightful owner. If the ring is empty the entry is
    /// dropped and counted.
    pub fn remigrate_on_leave<V>(
        &self,
        ring: &HashRing<V>,
        departed: &str,
        data: HashMap<String, V>,
    ) -> RebalanceReport {
        let started = Instant::now();
        let mut report = RebalanceReport::new(RebalanceType::OwnerLeave(departed.to_string()));
        let total = data.len();

        for (key, value) in data {
            match ring.place(key, value) {
                Ok(owner) => {
                    *report.targets.entry(owner.name().to_string()).or_insert(0) += 1;
                    report.moved += 1;
                }
                Err(_) => report.dropped += 1,
            }
        }

        if total > 0 {
            report.sources.insert(departed.to_string(), total);
        }
        report.duration = started.elapsed();

        if report.dropped > 0 {
            error!(
                owner = %departed,
                dropped = report.dropped,
                "No owners left, keys of departed owner were dropped"
            );
        }
        info!(
            owner = %departed,
            moved = report.moved,
            targets = report.targets.len(),
            "Remigrated keys of departed owner"
        );

        self.record(report.clone());
        report
    }

    /// Completed rebalances, oldest first.
    pub fn history(&self) -> Vec<RebalanceReport> {
        self.history.lock().iter().cloned().collect()
    }

    fn record(&self, report: RebalanceReport) {
        if self.max_history == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.max_history {
            history.pop_front();
        }
        history.push_back(report);
    }
}

impl Default for RebalanceCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

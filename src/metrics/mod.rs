//! Metrics module for monitoring and observability.
//!
//! Prometheus-style counters and gauges for the cache:
//! - Request counters for get/set/delete
//! - Rebalancing counters for keys moved and dropped
//! - Ring gauges for owners and occupied positions
//!
//! # Example
//!
//! ```rust
//! use ringcache::metrics::CacheMetrics;
//!
//! let metrics = CacheMetrics::new();
//! metrics.record_get(true);
//! metrics.record_get(false);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.get_total, 2);
//! assert!(metrics.to_prometheus().contains("cache_get_hits 1"));
//! ```

mod instruments;

pub use instruments::{Counter, Gauge};

/// Metrics for the ring cache.
#[derive(Debug)]
pub struct CacheMetrics {
    // Request counters
    /// Total GET requests.
    pub get_total: Counter,
    /// GET requests that found a value.
    pub get_hits: Counter,
    /// GET requests that found nothing.
    pub get_misses: Counter,
    /// Total SET requests.
    pub set_total: Counter,
    /// SET requests rejected because the ring was empty.
    pub set_failures: Counter,
    /// Total DELETE requests.
    pub delete_total: Counter,

    // Rebalancing
    /// Membership changes that triggered a rebalance.
    pub rebalance_total: Counter,
    /// Keys moved between owners.
    pub rebalance_entries_moved: Counter,
    /// Keys lost because the last owner left.
    pub rebalance_entries_dropped: Counter,

    // Ring state
    /// Attached owners.
    pub ring_owners: Gauge,
    /// Occupied ring positions.
    pub ring_positions: Gauge,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            get_total: Counter::new("cache_get_total", "Total GET requests"),
            get_hits: Counter::new("cache_get_hits", "GET requests that found a value"),
            get_misses: Counter::new("cache_get_misses", "GET requests that found nothing"),
            set_total: Counter::new("cache_set_total", "Total SET requests"),
            set_failures: Counter::new("cache_set_failures", "SET requests with no owner available"),
            delete_total: Counter::new("cache_delete_total", "Total DELETE requests"),

            rebalance_total: Counter::new("rebalance_total", "Total rebalancing operations"),
            rebalance_entries_moved: Counter::new(
                "rebalance_entries_moved",
                "Keys moved during rebalancing",
            ),
            rebalance_entries_dropped: Counter::new(
                "rebalance_entries_dropped",
                "Keys dropped because no owner was left",
            ),

            ring_owners: Gauge::new("ring_owners", "Attached owners"),
            ring_positions: Gauge::new("ring_positions", "Occupied ring positions"),
        }
    }

    /// Record a GET operation.
    pub fn record_get(&self, hit: bool) {
        self.get_total.inc();
        if hit {
            self.get_hits.inc();
        } else {
            self.get_misses.inc();
        }
    }

    /// Record a SET operation.
    pub fn record_set(&self, success: bool) {
        self.set_total.inc();
        if !success {
            self.set_failures.inc();
        }
    }

    pub fn record_delete(&self) {
        self.delete_total.inc();
    }

    /// Record a completed rebalance.
    pub fn record_rebalance(&self, moved: usize, dropped: usize) {
        self.rebalance_total.inc();
        self.rebalance_entries_moved.inc_by(moved as u64);
        self.rebalance_entries_dropped.inc_by(dropped as u64);
    }

    /// Update ring gauges after a membership change.
    pub fn update_ring(&self, owners: usize, positions: usize) {
        self.ring_owners.set(owners as i64);
        self.ring_positions.set(positions as i64);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            get_total: self.get_total.get(),
            get_hits: self.get_hits.get(),
            get_misses: self.get_misses.get(),
            set_total: self.set_total.get(),
            set_failures: self.set_failures.get(),
            delete_total: self.delete_total.get(),
            rebalance_total: self.rebalance_total.get(),
            entries_moved: self.rebalance_entries_moved.get(),
            entries_dropped: self.rebalance_entries_dropped.get(),
        }
    }

    /// Format metrics in Prometheus exposition format.
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        for counter in [
            &self.get_total,
            &self.get_hits,
            &self.get_misses,
            &self.set_total,
            &self.set_failures,
            &self.delete_total,
            &self.rebalance_total,
            &self.rebalance_entries_moved,
            &self.rebalance_entries_dropped,
        ] {
            counter.render(&mut output);
        }

        self.ring_owners.render(&mut output);
        self.ring_positions.render(&mut output);

        output
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub get_total: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub set_total: u64,
    pub set_failures: u64,
    pub delete_total: u64,
    pub rebalance_total: u64,
    pub entries_moved: u64,
    pub entries_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics() {
        let metrics = CacheMetrics::new();

        metrics.record_get(true);
        metrics.record_get(true);
        metrics.record_get(false);

        metrics.record_set(true);
        metrics.record_set(false);
        metrics.record_delete();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.get_total, 3);
        assert_eq!(snapshot.get_hits, 2);
        assert_eq!(snapshot.get_misses, 1);
        assert_eq!(snapshot.set_total, 2);
        assert_eq!(snapshot.set_failures, 1);
        assert_eq!(snapshot.delete_total, 1);
    }

    #[test]
    fn test_rebalance_metrics() {
        let metrics = CacheMetrics::new();
        metrics.record_rebalance(5, 0);
        metrics.record_rebalance(2, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.rebalance_total, 2);
        assert_eq!(snapshot.entries_moved, 7);
        assert_eq!(snapshot.entries_dropped, 1);
    }

    #[test]
    fn test_prometheus_output() {
        let metrics = CacheMetrics::new();
        metrics.record_get(true);
        metrics.update_ring(3, 9);

        let output = metrics.to_prometheus();

        assert!(output.contains("cache_get_total 1"));
        assert!(output.contains("# TYPE ring_positions gauge"));
        assert!(output.contains("ring_positions 9"));
        assert!(output.contains("HELP"));
    }
}

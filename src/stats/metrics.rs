//! Statistics and metrics for the routing loop
//!
//! Delivery failures are never surfaced to producers; these counters are the
//! only place a dropped message leaves a trace.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by the routing loop
#[derive(Debug, Default)]
pub struct RouterStats {
    routed: AtomicU64,
    delivered: AtomicU64,
    dropped_full: AtomicU64,
    dropped_unroutable: AtomicU64,
    dropped_disconnected: AtomicU64,
    discarded: AtomicU64,
}

impl RouterStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_routed(&self) {
        self.routed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_full(&self) {
        self.dropped_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_unroutable(&self) {
        self.dropped_unroutable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_disconnected(&self) {
        self.dropped_disconnected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, count: u64) {
        self.discarded.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> RouterStatsSnapshot {
        RouterStatsSnapshot {
            routed: self.routed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_unroutable: self.dropped_unroutable.load(Ordering::Relaxed),
            dropped_disconnected: self.dropped_disconnected.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RouterStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStatsSnapshot {
    /// Messages the loop has finished routing
    pub routed: u64,
    /// Successful mailbox enqueues (one per recipient)
    pub delivered: u64,
    /// Per-recipient drops because the mailbox was at capacity
    pub dropped_full: u64,
    /// Direct messages whose recipient was not registered
    pub dropped_unroutable: u64,
    /// Per-recipient drops because the consumer dropped its mailbox
    pub dropped_disconnected: u64,
    /// Accepted messages still queued inbound when shutdown fired
    pub discarded: u64,
}

impl RouterStatsSnapshot {
    /// Total per-recipient deliveries that did not happen
    pub fn dropped(&self) -> u64 {
        self.dropped_full + self.dropped_unroutable + self.dropped_disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let stats = RouterStats::new();
        stats.record_routed();
        stats.record_routed();
        stats.record_delivered();
        stats.record_dropped_full();
        stats.record_dropped_unroutable();
        stats.record_dropped_disconnected();
        stats.record_discarded(3);

        let snap = stats.snapshot();
        assert_eq!(snap.routed, 2);
        assert_eq!(snap.delivered, 1);
        assert_eq!(snap.dropped_disconnected, 1);
        assert_eq!(snap.dropped(), 3);
        assert_eq!(snap.discarded, 3);
    }

    #[test]
    fn test_default_snapshot_is_zero() {
        assert_eq!(RouterStats::new().snapshot(), RouterStatsSnapshot::default());
    }
}

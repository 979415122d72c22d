//! Counters for broadcast dispatch
//!
//! ## Usage
//!
//! ```ignore
//! use cp_registry::{Broadcaster, BusConfig};
//!
//! let broadcaster = Broadcaster::new(BusConfig::default());
//! // ... broadcasts ...
//! let snapshot = broadcaster.metrics().snapshot();
//! tracing::info!(deliveries = snapshot.deliveries, "dispatch stats");
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe dispatch counters.
#[derive(Debug, Default)]
pub struct BroadcastMetrics {
    /// Broadcasts started
    pub broadcasts: AtomicU64,
    /// Subscriber calls that succeeded
    pub deliveries: AtomicU64,
    /// Subscriber calls that returned an error
    pub failures: AtomicU64,
    /// Subscriber calls abandoned at the deadline
    pub timeouts: AtomicU64,
}

impl BroadcastMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a broadcast started
    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful subscriber call
    pub fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a subscriber call that returned an error
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a subscriber call abandoned at the deadline
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.broadcasts.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`BroadcastMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub broadcasts: u64,
    pub deliveries: u64,
    pub failures: u64,
    pub timeouts: u64,
}

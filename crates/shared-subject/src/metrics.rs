//! Dispatch counters for a subject
//!
//! Counters are shared between a subject and its outstanding subscriptions,
//! so unsubscribes performed through a token are counted too.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for subject activity.
#[derive(Debug, Default)]
pub struct SubjectMetrics {
    enabled: bool,
    /// Total notify calls
    notifications: AtomicU64,
    /// Total observer invocations across all notify calls
    deliveries: AtomicU64,
    /// Total subscribe calls
    subscriptions: AtomicU64,
    /// Total unsubscribes that removed an observer
    unsubscriptions: AtomicU64,
    /// Total subscriber tables published
    snapshots_published: AtomicU64,
}

impl SubjectMetrics {
    /// Create a collector; a disabled collector records nothing.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Whether counters are being recorded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a notify call
    pub fn record_notification(&self) {
        self.bump(&self.notifications, 1);
    }

    /// Record observer invocations from one notify call
    pub fn record_deliveries(&self, delivered: usize) {
        self.bump(&self.deliveries, delivered as u64);
    }

    /// Record a subscribe call
    pub fn record_subscription(&self) {
        self.bump(&self.subscriptions, 1);
    }

    /// Record an unsubscribe that removed an observer
    pub fn record_unsubscription(&self) {
        self.bump(&self.unsubscriptions, 1);
    }

    /// Record a published subscriber table
    pub fn record_snapshot(&self) {
        self.bump(&self.snapshots_published, 1);
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
            unsubscriptions: self.unsubscriptions.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
        }
    }

    fn bump(&self, counter: &AtomicU64, by: u64) {
        if self.enabled {
            counter.fetch_add(by, Ordering::Relaxed);
        }
    }
}

/// Serializable copy of [`SubjectMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub notifications: u64,
    pub deliveries: u64,
    pub subscriptions: u64,
    pub unsubscriptions: u64,
    pub snapshots_published: u64,
}

//! Counters for logger and delivery observability
//!
//! `LoggerMetrics` tracks events dispatched by a `Logger`; `DeliveryMetrics`
//! tracks what happened to GELF messages on their way to the collector.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_gelf_appender::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Number of events at least one appender failed on
    dropped_count: AtomicU64,

    /// Number of events every appender accepted
    total_logged: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    /// Record a dropped event, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been logged.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
        }
    }
}

/// Outcome counters for GELF message delivery
///
/// Shared by the appender (construction and hand-over) and the client
/// (writes to the collector).
#[derive(Debug)]
pub struct DeliveryMetrics {
    /// Messages accepted by the transport or written to the collector
    sent: AtomicU64,

    /// Non-blocking hand-overs the transport refused
    rejected: AtomicU64,

    /// Blocking hand-overs or writes that failed
    failed: AtomicU64,

    /// Events that could not be turned into a GELF message
    construction_failed: AtomicU64,
}

impl DeliveryMetrics {
    pub const fn new() -> Self {
        Self {
            sent: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            construction_failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn construction_failed(&self) -> u64 {
        self.construction_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sent(&self) -> u64 {
        self.sent.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_construction_failed(&self) -> u64 {
        self.construction_failed.fetch_add(1, Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.sent.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.construction_failed.store(0, Ordering::Relaxed);
    }
}

impl Default for DeliveryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeliveryMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            sent: AtomicU64::new(self.sent()),
            rejected: AtomicU64::new(self.rejected()),
            failed: AtomicU64::new(self.failed()),
            construction_failed: AtomicU64::new(self.construction_failed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_record_dropped() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0); // Returns previous value
        assert_eq!(metrics.dropped_count(), 1);
        metrics.record_dropped();
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_metrics_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_logged();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }

        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }

    #[test]
    fn test_delivery_metrics_snapshot_is_independent() {
        let metrics = DeliveryMetrics::new();
        metrics.record_sent();
        metrics.record_rejected();
        metrics.record_rejected();

        let snapshot = metrics.clone();
        metrics.record_failed();
        metrics.record_construction_failed();

        assert_eq!(snapshot.sent(), 1);
        assert_eq!(snapshot.rejected(), 2);
        assert_eq!(snapshot.failed(), 0);
        assert_eq!(metrics.failed(), 1);
        assert_eq!(metrics.construction_failed(), 1);

        metrics.reset();
        assert_eq!(metrics.rejected(), 0);
    }
}

//! Statistics for the relay loop

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::registry::DeliveryReport;

/// Live counters shared between the relay loop and its handles
#[derive(Debug)]
pub struct RelayCounters {
    started_at: Instant,
    passes: AtomicU64,
    empty_passes: AtomicU64,
    messages_buffered: AtomicU64,
    messages_overwritten: AtomicU64,
    messages_delivered: AtomicU64,
    messages_dropped: AtomicU64,
    subscribers_evicted: AtomicU64,
}

impl RelayCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            passes: AtomicU64::new(0),
            empty_passes: AtomicU64::new(0),
            messages_buffered: AtomicU64::new(0),
            messages_overwritten: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            subscribers_evicted: AtomicU64::new(0),
        }
    }

    /// Record a finished drain/flush cycle
    pub(crate) fn record_pass(&self, buffered: u64, overwritten: u64, report: DeliveryReport) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        if buffered == 0 {
            self.empty_passes.fetch_add(1, Ordering::Relaxed);
        }
        self.messages_buffered.fetch_add(buffered, Ordering::Relaxed);
        self.messages_overwritten
            .fetch_add(overwritten, Ordering::Relaxed);
        self.messages_delivered
            .fetch_add(report.delivered, Ordering::Relaxed);
        self.messages_dropped.fetch_add(report.dropped, Ordering::Relaxed);
        self.subscribers_evicted
            .fetch_add(report.evicted, Ordering::Relaxed);
    }

    /// Take a point-in-time copy
    pub fn snapshot(&self) -> RelayStats {
        RelayStats {
            uptime: self.started_at.elapsed(),
            passes: self.passes.load(Ordering::Relaxed),
            empty_passes: self.empty_passes.load(Ordering::Relaxed),
            messages_buffered: self.messages_buffered.load(Ordering::Relaxed),
            messages_overwritten: self.messages_overwritten.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            subscribers_evicted: self.subscribers_evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for RelayCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay-wide statistics
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Time since the relay was created
    pub uptime: Duration,
    /// Completed drain/flush cycles
    pub passes: u64,
    /// Cycles that buffered nothing
    pub empty_passes: u64,
    /// Messages routed into a ring buffer
    pub messages_buffered: u64,
    /// Buffered messages pushed out by newer ones before a flush
    pub messages_overwritten: u64,
    /// Successful sink deliveries
    pub messages_delivered: u64,
    /// Deliveries refused by a sink that stayed subscribed
    pub messages_dropped: u64,
    /// Subscribers evicted for backpressure
    pub subscribers_evicted: u64,
}

impl RelayStats {
    /// Average buffered messages per pass
    pub fn messages_per_pass(&self) -> f64 {
        if self.passes > 0 {
            self.messages_buffered as f64 / self.passes as f64
        } else {
            0.0
        }
    }
}

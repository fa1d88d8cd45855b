//! Tracing setup and in-process counters

use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "windowcount=info,tower_http=info";

/// Install the global fmt subscriber, honouring `RUST_LOG` when set
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Counters for the recording path
#[derive(Debug, Default)]
pub struct Metrics {
    events_recorded: AtomicU64,
    events_failed: AtomicU64,
    entries_pruned: AtomicU64,
    syncs_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_recorded(&self) {
        self.events_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "events_recorded", "Metric incremented");
    }

    pub fn event_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_failed", "Metric incremented");
    }

    pub fn entries_pruned(&self, count: usize) {
        if count > 0 {
            self.entries_pruned.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub fn sync_failed(&self) {
        self.syncs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "syncs_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_recorded: self.events_recorded.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            entries_pruned: self.entries_pruned.load(Ordering::Relaxed),
            syncs_failed: self.syncs_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_recorded: u64,
    pub events_failed: u64,
    pub entries_pruned: u64,
    pub syncs_failed: u64,
}

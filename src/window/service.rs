use std::sync::Arc;

use tracing::{debug, info};

use super::Timestamp;
use super::clock::{Clock, SystemClock};
use super::error::ServiceError;
use super::store::TimestampStore;
use crate::observability::Metrics;

/// Per-request protocol over a [`TimestampStore`]
///
/// `record_timestamp` prunes before admitting the new event, so the returned
/// count always includes the event just stored.
#[derive(Debug, Clone)]
pub struct TimestampService {
    store: Arc<TimestampStore>,
    threshold: i64,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
}

impl TimestampService {
    pub fn new(store: Arc<TimestampStore>, threshold: i64) -> Self {
        Self {
            store,
            threshold,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &Arc<TimestampStore> {
        &self.store
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Load the file, drop what has expired since, write the result back
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        self.initialize_at(self.clock.now()).await
    }

    pub async fn initialize_at(&self, now: Timestamp) -> Result<(), ServiceError> {
        self.store.load().await.map_err(ServiceError::Load)?;

        let stats = self.store.remove_expired(now, self.threshold).await;
        self.metrics.entries_pruned(stats.removed);

        self.store.sync().await.map_err(|e| {
            self.metrics.sync_failed();
            ServiceError::Sync(e)
        })?;

        info!(
            active = stats.retained,
            expired = stats.removed,
            threshold = self.threshold,
            "Timestamp window initialized"
        );
        Ok(())
    }

    /// Record one event at the current instant and return the window count
    pub async fn record_timestamp(&self) -> Result<usize, ServiceError> {
        self.record_timestamp_at(self.clock.now()).await
    }

    pub async fn record_timestamp_at(&self, now: Timestamp) -> Result<usize, ServiceError> {
        let stats = self.store.remove_expired(now, self.threshold).await;
        self.metrics.entries_pruned(stats.removed);

        self.store.store(now).await;

        if let Err(e) = self.store.sync().await {
            self.metrics.sync_failed();
            self.metrics.event_failed();
            return Err(ServiceError::Sync(e));
        }

        let count = self.store.count().await;
        self.metrics.event_recorded();
        debug!(now, count, "Recorded timestamp");
        Ok(count)
    }
}

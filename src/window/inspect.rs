//! Read-only view of a timestamp file

use std::path::Path;

use super::Timestamp;
use super::error::Result;
use super::persistence::MalformedLines;
use super::store::TimestampStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowReport {
    /// Entries still inside the window, in file order
    pub active: Vec<Timestamp>,
    pub expired: usize,
}

impl WindowReport {
    pub fn count(&self) -> usize {
        self.active.len()
    }
}

/// Load `path` and prune it against `now` without writing anything back
pub async fn inspect_file(
    path: &Path,
    malformed: MalformedLines,
    now: Timestamp,
    threshold: i64,
) -> Result<WindowReport> {
    let store = TimestampStore::open_file(path, malformed);
    store.load().await?;

    let stats = store.remove_expired(now, threshold).await;

    Ok(WindowReport {
        active: store.view().await,
        expired: stats.removed,
    })
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::Timestamp;
use super::error::{PersistenceError, Result};
use super::persistence::{FilePersistence, MalformedLines, Persistence};
use super::pruning::{PruneStats, prune_expired};

/// In-memory window of timestamps mirrored to a flat file
///
/// Mutations take the write lock for their whole duration. `sync` only holds
/// the read lock while copying the collection, so disk latency never blocks
/// `store` or `remove_expired` from other requests. File writes from
/// concurrent `sync` calls are serialized by `io_lock`, which is acquired
/// before the copy, so the file always ends with the newest snapshot.
pub struct TimestampStore {
    path: PathBuf,
    persistence: Arc<dyn Persistence>,
    timestamps: RwLock<Vec<Timestamp>>,
    io_lock: Arc<Mutex<()>>,
    closed: AtomicBool,
}

impl TimestampStore {
    pub fn new<P: Into<PathBuf>>(path: P, persistence: Arc<dyn Persistence>) -> Self {
        Self {
            path: path.into(),
            persistence,
            timestamps: RwLock::new(Vec::new()),
            io_lock: Arc::new(Mutex::new(())),
            closed: AtomicBool::new(false),
        }
    }

    /// Store backed by the flat-file encoding at `path`
    pub fn open_file<P: Into<PathBuf>>(path: P, malformed: MalformedLines) -> Self {
        let persistence = FilePersistence::new().with_malformed_lines(malformed);
        Self::new(path, Arc::new(persistence))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the collection with the file contents
    ///
    /// On error the in-memory collection is left as it was before the call.
    pub async fn load(&self) -> Result<()> {
        let mut timestamps = self.timestamps.write().await;
        let loaded = self.persistence.read_all(&self.path).await?;
        info!(path = %self.path.display(), count = loaded.len(), "Loaded timestamps");
        *timestamps = loaded;
        Ok(())
    }

    pub async fn store(&self, timestamp: Timestamp) {
        self.timestamps.write().await.push(timestamp);
    }

    /// Keep only entries with `current - t < threshold`
    pub async fn remove_expired(&self, current: Timestamp, threshold: i64) -> PruneStats {
        let mut timestamps = self.timestamps.write().await;
        let stats = prune_expired(&mut timestamps, current, threshold);
        if stats.removed > 0 {
            debug!(current, threshold, removed = stats.removed, "Pruned expired timestamps");
        }
        stats
    }

    /// Independent copy of the collection in insertion order
    pub async fn view(&self) -> Vec<Timestamp> {
        self.timestamps.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.timestamps.read().await.len()
    }

    /// Rewrite the backing file with the current collection
    ///
    /// The write runs in its own task holding the I/O guard, so dropping the
    /// caller's future cannot release the guard while bytes are in flight.
    pub async fn sync(&self) -> Result<()> {
        let io = Arc::clone(&self.io_lock).lock_owned().await;
        let snapshot = self.view().await;
        let persistence = Arc::clone(&self.persistence);
        let path = self.path.clone();

        let write = tokio::spawn(async move {
            let _io = io;
            persistence.rewrite(&path, &snapshot).await?;
            Ok::<_, PersistenceError>(snapshot.len())
        });

        let count = match write.await {
            Ok(result) => result?,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(PersistenceError::io(&self.path, std::io::Error::other(e))),
        };
        debug!(path = %self.path.display(), count, "Synced timestamps");
        Ok(())
    }

    /// Final sync. Later calls are no-ops once a close has succeeded.
    pub async fn close(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            debug!(path = %self.path.display(), "Store already closed");
            return Ok(());
        }

        self.sync().await?;
        self.closed.store(true, Ordering::Release);
        info!(path = %self.path.display(), "Timestamp store closed");
        Ok(())
    }
}

impl std::fmt::Debug for TimestampStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampStore")
            .field("path", &self.path)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn create_test_store() -> (TimestampStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = TimestampStore::open_file(temp_dir.path().join("test.log"), MalformedLines::Fail);
        (store, temp_dir)
    }

    fn file_lines(store: &TimestampStore) -> Vec<String> {
        std::fs::read_to_string(store.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_store_and_count() {
        let (store, _temp) = create_test_store();

        store.store(0).await;
        store.store(1000).await;
        store.store(1000).await;

        assert_eq!(store.count().await, 3);
        assert_eq!(store.view().await, vec![0, 1000, 1000]);
    }

    #[tokio::test]
    async fn test_view_is_a_copy() {
        let (store, _temp) = create_test_store();
        store.store(10).await;

        let mut view = store.view().await;
        view[0] = 999_999;
        view.push(1);

        assert_eq!(store.view().await, vec![10]);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let (store, _temp) = create_test_store();

        store.load().await.unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_load_replaces_collection() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "940\n990\n").unwrap();
        store.store(5).await;

        store.load().await.unwrap();

        assert_eq!(store.view().await, vec![940, 990]);
    }

    #[tokio::test]
    async fn test_load_malformed_fails() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "940\nabc\n").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(PersistenceError::Parse { line: 2, .. })));
    }

    #[tokio::test]
    async fn test_load_malformed_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.log");
        std::fs::write(&path, "940\nabc\n990\n").unwrap();
        let store = TimestampStore::open_file(&path, MalformedLines::Skip);

        store.load().await.unwrap();
        assert_eq!(store.view().await, vec![940, 990]);
    }

    #[tokio::test]
    async fn test_remove_expired_boundary() {
        let (store, _temp) = create_test_store();
        for t in [940, 941, 990] {
            store.store(t).await;
        }

        let stats = store.remove_expired(1000, 60).await;

        assert_eq!(stats.removed, 1);
        assert_eq!(store.view().await, vec![941, 990]);
    }

    #[tokio::test]
    async fn test_remove_expired_is_deterministic() {
        let (store, _temp) = create_test_store();
        for t in [900, 950, 999] {
            store.store(t).await;
        }

        store.remove_expired(1000, 60).await;
        let stats = store.remove_expired(1000, 60).await;

        assert_eq!(stats.removed, 0);
        assert_eq!(store.view().await, vec![950, 999]);
    }

    #[tokio::test]
    async fn test_sync_mirrors_collection() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "1\n2\n3\n4\n").unwrap();
        store.store(990).await;
        store.store(1000).await;

        store.sync().await.unwrap();

        assert_eq!(file_lines(&store), vec!["990", "1000"]);
    }

    #[tokio::test]
    async fn test_sync_twice_is_idempotent() {
        let (store, _temp) = create_test_store();
        store.store(990).await;
        store.store(1000).await;

        store.sync().await.unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();
        store.sync().await.unwrap();
        let second = std::fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sync_failure_is_surfaced() {
        let temp_dir = TempDir::new().unwrap();
        let store = TimestampStore::open_file(
            temp_dir.path().join("missing").join("test.log"),
            MalformedLines::Fail,
        );
        store.store(1).await;

        assert!(matches!(store.sync().await, Err(PersistenceError::Io { .. })));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_double_close() {
        let (store, _temp) = create_test_store();
        store.store(1000).await;

        store.close().await.unwrap();
        store.close().await.unwrap();

        assert_eq!(file_lines(&store), vec!["1000"]);
        assert_eq!(store.view().await, vec![1000]);
    }

    #[tokio::test]
    async fn test_concurrent_store() {
        let (store, _temp) = create_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.store(i).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count().await, 50);
        let mut view = store.view().await;
        view.sort();
        assert_eq!(view, (0..50).collect::<Vec<_>>());
    }

    /// Persistence whose rewrite parks until released
    struct GatedPersistence {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Persistence for GatedPersistence {
        async fn read_all(&self, _path: &Path) -> Result<Vec<Timestamp>> {
            Ok(Vec::new())
        }

        async fn append(&self, _path: &Path, _timestamp: Timestamp) -> Result<()> {
            Ok(())
        }

        async fn rewrite(&self, _path: &Path, _timestamps: &[Timestamp]) -> Result<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn file_exists(&self, _path: &Path) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_sync_io_does_not_block_mutation() {
        let gate = Arc::new(GatedPersistence {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let store = Arc::new(TimestampStore::new("unused.log", gate.clone()));
        store.store(1).await;

        let syncing = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.sync().await })
        };
        gate.entered.notified().await;

        // The rewrite is parked; mutations and reads must still go through.
        tokio::time::timeout(Duration::from_secs(1), async {
            store.store(2).await;
            store.remove_expired(10, 60).await;
            assert_eq!(store.count().await, 2);
        })
        .await
        .expect("store blocked behind sync I/O");

        gate.release.notify_one();
        syncing.await.unwrap().unwrap();
    }

    /// File persistence whose first rewrite parks until released
    struct SlowFirstWrite {
        inner: FilePersistence,
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        log: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl Persistence for SlowFirstWrite {
        async fn read_all(&self, path: &Path) -> Result<Vec<Timestamp>> {
            self.inner.read_all(path).await
        }

        async fn append(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
            self.inner.append(path, timestamp).await
        }

        async fn rewrite(&self, path: &Path, timestamps: &[Timestamp]) -> Result<()> {
            self.log.lock().unwrap().push(format!("start {timestamps:?}"));
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.rewrite(path, timestamps).await?;
            self.log.lock().unwrap().push(format!("end {timestamps:?}"));
            Ok(())
        }

        async fn file_exists(&self, path: &Path) -> bool {
            self.inner.file_exists(path).await
        }
    }

    #[tokio::test]
    async fn test_cancelled_sync_finishes_before_next_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.log");
        let slow = Arc::new(SlowFirstWrite {
            inner: FilePersistence::new(),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
            log: StdMutex::new(Vec::new()),
        });
        let store = Arc::new(TimestampStore::new(&path, slow.clone()));
        store.store(1).await;

        // The caller gives up while the first write is still in progress.
        let timed_out = tokio::time::timeout(Duration::from_millis(50), store.sync()).await;
        assert!(timed_out.is_err());
        slow.entered.notified().await;

        store.store(2).await;
        let next = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.sync().await })
        };

        // The next write waits for the abandoned one instead of racing it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*slow.log.lock().unwrap(), vec!["start [1]"]);

        slow.release.notify_one();
        next.await.unwrap().unwrap();

        assert_eq!(
            *slow.log.lock().unwrap(),
            vec!["start [1]", "end [1]", "start [1, 2]", "end [1, 2]"]
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1\n2\n");
        assert_eq!(
            FilePersistence::new().read_all(&path).await.unwrap(),
            store.view().await
        );
    }
}

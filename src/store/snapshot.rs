use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::models::{ContentCatalog, TitleCatalog};

use super::RecommendationStore;

/// Everything the serving path reads, loaded together and never mutated
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub store: RecommendationStore,
    pub titles: TitleCatalog,
    pub content: ContentCatalog,
}

/// Holds the active snapshot and swaps it atomically on refresh
///
/// Readers clone the `Arc` and drop the lock immediately, so a query keeps
/// the snapshot it started with even if a new one is published meanwhile.
pub struct SnapshotHandle {
    current: RwLock<Arc<Snapshot>>,
    version: AtomicU64,
    rebuild: Mutex<()>,
}

impl SnapshotHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            version: AtomicU64::new(1),
            rebuild: Mutex::new(()),
        }
    }

    /// Waits for exclusive use of the rebuild slot
    ///
    /// Holders save and publish a new snapshot before releasing it.
    pub async fn lock_rebuild(&self) -> MutexGuard<'_, ()> {
        self.rebuild.lock().await
    }

    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Replaces the active snapshot, returning the new version number
    pub async fn publish(&self, snapshot: Snapshot) -> u64 {
        let items = snapshot.store.len();
        let mut guard = self.current.write().await;
        *guard = Arc::new(snapshot);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        drop(guard);

        tracing::info!(version, items, "Published recommendation snapshot");
        version
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StoreError;
use super::repository::CollectionStore;

/// In-memory collection for service and handler tests. Writes can be made to
/// fail on demand to exercise error paths.
pub struct MemoryStore<T> {
    items: RwLock<Vec<T>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `replace` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> CollectionStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn replace(&self, items: &[T]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                "write",
                "memory",
                io::Error::other("simulated write failure"),
            ));
        }
        *self.items.write().await = items.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

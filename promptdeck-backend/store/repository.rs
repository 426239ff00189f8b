use async_trait::async_trait;

use super::StoreError;

/// One persisted collection (all prompts, or all folders), read and written
/// as a whole. Order is meaningful: `list` returns items in the order the
/// last `replace` stored them.
#[async_trait]
pub trait CollectionStore<T: Send + Sync + 'static>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, StoreError>;
    async fn replace(&self, items: &[T]) -> Result<(), StoreError>;
}

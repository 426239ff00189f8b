use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::StoreError;
use super::repository::CollectionStore;

/// A collection kept as a single pretty-printed JSON array on disk, e.g.
/// `data/prompts.json`. Nothing is cached; every call goes to the file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _marker: PhantomData,
        }
    }

    /// Create the parent directory and an empty-array file if either is missing.
    fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| StoreError::io("create data dir", dir, e))?;
                tracing::info!(dir = %dir.display(), "created data directory");
            }
        }
        if !self.path.exists() {
            std::fs::write(&self.path, "[]")
                .map_err(|e| StoreError::io("initialise", &self.path, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T> CollectionStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.ensure_exists()?;

        let content = match std::fs::read(&self.path) {
            Ok(c) => c,
            // Deleted between ensure_exists and the read.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io("read", &self.path, e)),
        };

        match serde_json::from_slice::<Vec<T>>(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable collection file, treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn replace(&self, items: &[T]) -> Result<(), StoreError> {
        self.ensure_exists()?;

        let content = serde_json::to_string_pretty(items)?;

        // Atomic write via temp file + rename
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|e| StoreError::io("write", &tmp_path, e))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| StoreError::io("replace", &self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = items.len(), "persisted collection");
        Ok(())
    }
}

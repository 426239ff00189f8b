use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{EntityKind, LibraryError, LibraryResult, require_text};
use crate::ids::IdGenerator;
use crate::library::WriteLock;
use crate::prompts::Prompt;
use crate::store::repository::CollectionStore;

use super::Folder;

/// Result of deleting a folder: the ids of prompts that were unfiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderRemoval {
    pub unfiled_prompt_ids: Vec<String>,
}

/// CRUD over folders. Holds the prompt store as well so deletion can unfile
/// member prompts.
pub struct FolderService {
    folders: Arc<dyn CollectionStore<Folder>>,
    prompts: Arc<dyn CollectionStore<Prompt>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    write_lock: WriteLock,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn CollectionStore<Folder>>,
        prompts: Arc<dyn CollectionStore<Prompt>>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            folders,
            prompts,
            ids,
            clock,
            write_lock,
        }
    }

    pub async fn list(&self) -> LibraryResult<Vec<Folder>> {
        Ok(self.folders.list().await?)
    }

    pub async fn get(&self, id: &str) -> LibraryResult<Folder> {
        self.folders
            .list()
            .await?
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Folder, id))
    }

    pub async fn add(&self, name: &str) -> LibraryResult<Folder> {
        require_text(name, "Name is required")?;

        let _guard = self.write_lock.lock().await;
        let mut folders = self.folders.list().await?;

        let folder = Folder {
            id: self.ids.next_id(),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        folders.push(folder.clone());
        self.folders.replace(&folders).await?;

        tracing::info!(folder_id = %folder.id, name = %folder.name, "created folder");
        Ok(folder)
    }

    pub async fn rename(&self, id: &str, name: &str) -> LibraryResult<Folder> {
        require_text(name, "Name is required")?;

        let _guard = self.write_lock.lock().await;
        let mut folders = self.folders.list().await?;

        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Folder, id))?;
        folder.name = name.to_string();
        let renamed = folder.clone();

        self.folders.replace(&folders).await?;

        tracing::info!(folder_id = %id, name = %renamed.name, "renamed folder");
        Ok(renamed)
    }

    /// Delete a folder and unfile its prompts.
    ///
    /// The prompt collection is rewritten before the folder collection. If the
    /// folder write then fails, the folder is still listed and a retry finishes
    /// the job; the unfiling step is a no-op the second time.
    pub async fn remove(&self, id: &str) -> LibraryResult<FolderRemoval> {
        let _guard = self.write_lock.lock().await;

        let folders = self.folders.list().await?;
        if !folders.iter().any(|f| f.id == id) {
            return Err(LibraryError::not_found(EntityKind::Folder, id));
        }

        let removal = self.unfile_members(id).await?;

        let remaining: Vec<Folder> = folders.into_iter().filter(|f| f.id != id).collect();
        self.folders.replace(&remaining).await?;

        tracing::info!(
            folder_id = %id,
            unfiled = removal.unfiled_prompt_ids.len(),
            "deleted folder"
        );
        Ok(removal)
    }

    /// Clear `folder_id` on every prompt filed under `folder_id`. Writes the
    /// prompt collection only when something changed.
    async fn unfile_members(&self, folder_id: &str) -> LibraryResult<FolderRemoval> {
        let mut prompts = self.prompts.list().await?;

        let mut unfiled_prompt_ids = Vec::new();
        for prompt in prompts.iter_mut() {
            if prompt.folder_id.as_deref() == Some(folder_id) {
                prompt.folder_id = None;
                unfiled_prompt_ids.push(prompt.id.clone());
            }
        }

        if !unfiled_prompt_ids.is_empty() {
            self.prompts.replace(&prompts).await?;
        }
        Ok(FolderRemoval { unfiled_prompt_ids })
    }
}

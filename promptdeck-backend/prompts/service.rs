use std::sync::Arc;

use crate::clock::{self, Clock};
use crate::error::{EntityKind, LibraryError, LibraryResult, require_text};
use crate::ids::IdGenerator;
use crate::library::WriteLock;
use crate::store::repository::CollectionStore;

use super::{NewPrompt, Prompt, PromptPatch};

/// CRUD over the prompt collection. Every call re-reads the store; mutations
/// hold the library write lock across their read-modify-write cycle.
pub struct PromptService {
    store: Arc<dyn CollectionStore<Prompt>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    write_lock: WriteLock,
}

impl PromptService {
    pub fn new(
        store: Arc<dyn CollectionStore<Prompt>>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            write_lock,
        }
    }

    pub async fn list(&self) -> LibraryResult<Vec<Prompt>> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: &str) -> LibraryResult<Prompt> {
        self.store
            .list()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Prompt, id))
    }

    pub async fn add(&self, new: NewPrompt) -> LibraryResult<Prompt> {
        require_text(&new.title, "Title and content are required")?;
        require_text(&new.content, "Title and content are required")?;

        let _guard = self.write_lock.lock().await;
        let mut prompts = self.store.list().await?;

        let now = self.clock.now();
        let prompt = Prompt {
            id: self.ids.next_id(),
            title: new.title,
            content: new.content,
            folder_id: normalize_folder_id(new.folder_id),
            created_at: now,
            updated_at: now,
        };
        prompts.push(prompt.clone());
        self.store.replace(&prompts).await?;

        tracing::info!(prompt_id = %prompt.id, title = %prompt.title, "created prompt");
        Ok(prompt)
    }

    pub async fn update(&self, id: &str, mut patch: PromptPatch) -> LibraryResult<Prompt> {
        if let Some(title) = &patch.title {
            require_text(title, "Title must not be empty")?;
        }
        if let Some(content) = &patch.content {
            require_text(content, "Content must not be empty")?;
        }
        patch.folder_id = patch.folder_id.map(normalize_folder_id);
        let touched_fields = !patch.is_empty();

        let _guard = self.write_lock.lock().await;
        let mut prompts = self.store.list().await?;

        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Prompt, id))?;

        let previous = prompt.updated_at;
        patch.apply_to(prompt);
        prompt.updated_at = clock::later_than(self.clock.as_ref(), previous);
        let updated = prompt.clone();

        self.store.replace(&prompts).await?;

        tracing::info!(prompt_id = %id, touched_fields, "updated prompt");
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> LibraryResult<()> {
        let _guard = self.write_lock.lock().await;
        let prompts = self.store.list().await?;

        let before = prompts.len();
        let remaining: Vec<Prompt> = prompts.into_iter().filter(|p| p.id != id).collect();
        if remaining.len() == before {
            return Err(LibraryError::not_found(EntityKind::Prompt, id));
        }
        self.store.replace(&remaining).await?;

        tracing::info!(prompt_id = %id, "deleted prompt");
        Ok(())
    }
}

/// The UI's "no folder" choice arrives as an empty string.
fn normalize_folder_id(folder_id: Option<String>) -> Option<String> {
    folder_id.filter(|f| !f.trim().is_empty())
}

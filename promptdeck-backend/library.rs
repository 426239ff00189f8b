use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::folders::Folder;
use crate::folders::service::FolderService;
use crate::ids::IdGenerator;
use crate::prompts::Prompt;
use crate::prompts::service::PromptService;
use crate::store::file_repository::JsonFileStore;
use crate::store::repository::CollectionStore;

/// Serializes read-modify-write cycles across both collections.
pub type WriteLock = Arc<Mutex<()>>;

pub const PROMPTS_FILE: &str = "prompts.json";
pub const FOLDERS_FILE: &str = "folders.json";

/// The prompt and folder services wired to the same stores, id generator,
/// clock and write lock.
pub struct Library {
    pub prompts: PromptService,
    pub folders: FolderService,
}

impl Library {
    pub fn new(
        prompt_store: Arc<dyn CollectionStore<Prompt>>,
        folder_store: Arc<dyn CollectionStore<Folder>>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let write_lock = WriteLock::default();
        Self {
            prompts: PromptService::new(
                prompt_store.clone(),
                ids.clone(),
                clock.clone(),
                write_lock.clone(),
            ),
            folders: FolderService::new(folder_store, prompt_store, ids, clock, write_lock),
        }
    }

    /// Open the JSON files under `data_dir` (created lazily on first access).
    pub fn open(data_dir: impl AsRef<Path>, ids: Arc<dyn IdGenerator>) -> Self {
        let paths = LibraryPaths::new(data_dir);
        Self::new(
            Arc::new(JsonFileStore::<Prompt>::new(&paths.prompts)),
            Arc::new(JsonFileStore::<Folder>::new(&paths.folders)),
            ids,
            Arc::new(SystemClock),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryPaths {
    pub prompts: PathBuf,
    pub folders: PathBuf,
}

impl LibraryPaths {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            prompts: dir.join(PROMPTS_FILE),
            folders: dir.join(FOLDERS_FILE),
        }
    }
}

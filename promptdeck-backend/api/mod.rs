pub mod changes;
pub mod error;
pub mod folders;
pub mod middleware;
pub mod prompts;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::api::changes::{ChangeType, ResourceChangeEvent, ResourceType};
use crate::chat::ChatSettings;
use crate::chat::client::ChatClient;
use crate::library::Library;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
    pub chat_client: Arc<ChatClient>,
    /// Server-side defaults for the chat relay; requests may override them.
    pub chat_settings: Arc<ChatSettings>,
    pub changes_tx: broadcast::Sender<ResourceChangeEvent>,
    /// Prebuilt browser UI served for non-API paths, when configured.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Announce a mutation on the change feed. Having no subscribers is fine.
    pub fn notify(&self, resource_type: ResourceType, change_type: ChangeType, resource_id: &str) {
        let _ = self.changes_tx.send(ResourceChangeEvent {
            resource_type,
            change_type,
            resource_id: resource_id.to_string(),
            timestamp: Utc::now(),
        });
    }
}

pub fn create_app(state: AppState) -> Router {
    routes::build_router(state)
}

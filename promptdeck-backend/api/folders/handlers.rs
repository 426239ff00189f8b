use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::changes::{ChangeType, ResourceType};
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::folders::Folder;

#[derive(Deserialize)]
pub(crate) struct FolderBody {
    #[serde(default)]
    name: String,
}

pub(crate) async fn list_folders(State(state): State<AppState>) -> Result<Json<Vec<Folder>>, ApiError> {
    let folders = state
        .library
        .folders
        .list()
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to load folders"))?;
    Ok(Json(folders))
}

pub(crate) async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Folder>, ApiError> {
    let folder = state
        .library
        .folders
        .get(&id)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to load folder"))?;
    Ok(Json(folder))
}

pub(crate) async fn create_folder(
    State(state): State<AppState>,
    body: Result<Json<FolderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let Json(body) = body?;

    let folder = state
        .library
        .folders
        .add(&body.name)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to create folder"))?;

    state.notify(ResourceType::Folder, ChangeType::Created, &folder.id);
    Ok((StatusCode::CREATED, Json(folder)))
}

pub(crate) async fn rename_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FolderBody>, JsonRejection>,
) -> Result<Json<Folder>, ApiError> {
    let Json(body) = body?;

    let folder = state
        .library
        .folders
        .rename(&id, &body.name)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to update folder"))?;

    state.notify(ResourceType::Folder, ChangeType::Updated, &id);
    Ok(Json(folder))
}

/// Deleting a folder unfiles its prompts; each of those is announced as a
/// prompt update before the folder deletion itself.
pub(crate) async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removal = state
        .library
        .folders
        .remove(&id)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to delete folder"))?;

    for prompt_id in &removal.unfiled_prompt_ids {
        state.notify(ResourceType::Prompt, ChangeType::Updated, prompt_id);
    }
    state.notify(ResourceType::Folder, ChangeType::Deleted, &id);
    Ok(Json(json!({ "success": true })))
}

//! REST endpoints for prompts.
//!
//! GET    /api/prompts        every prompt, in storage order
//! POST   /api/prompts        create; `title` and `content` required
//! GET    /api/prompts/{id}   one prompt
//! PUT    /api/prompts/{id}   partial update; `folderId: null` unfiles
//! DELETE /api/prompts/{id}   remove

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;
use serde_json::{json, Value};

use crate::api::changes::{ChangeType, ResourceType};
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::prompts::{NewPrompt, Prompt, PromptPatch};

pub(crate) async fn list_prompts(State(state): State<AppState>) -> Result<Json<Vec<Prompt>>, ApiError> {
    let prompts = state
        .library
        .prompts
        .list()
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to load prompts"))?;
    Ok(Json(prompts))
}

pub(crate) async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prompt>, ApiError> {
    let prompt = state
        .library
        .prompts
        .get(&id)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to load prompt"))?;
    Ok(Json(prompt))
}

pub(crate) async fn create_prompt(
    State(state): State<AppState>,
    body: Result<Json<NewPrompt>, JsonRejection>,
) -> Result<(StatusCode, Json<Prompt>), ApiError> {
    let Json(body) = body?;

    let prompt = state
        .library
        .prompts
        .add(body)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to create prompt"))?;

    state.notify(ResourceType::Prompt, ChangeType::Created, &prompt.id);
    Ok((StatusCode::CREATED, Json(prompt)))
}

pub(crate) async fn update_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PromptPatch>, JsonRejection>,
) -> Result<Json<Prompt>, ApiError> {
    let Json(patch) = body?;

    let prompt = state
        .library
        .prompts
        .update(&id, patch)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to update prompt"))?;

    state.notify(ResourceType::Prompt, ChangeType::Updated, &id);
    Ok(Json(prompt))
}

pub(crate) async fn delete_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .library
        .prompts
        .remove(&id)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to delete prompt"))?;

    state.notify(ResourceType::Prompt, ChangeType::Deleted, &id);
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::api::create_app;
    use crate::api::test_support::{send, send_raw, test_app, test_state_with};
    use crate::store::memory_repository::MemoryStore;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn create(app: &axum::Router, body: Value) -> Value {
        let (status, created) = send(app, Method::POST, "/api/prompts", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn test_list_starts_empty() {
        let (app, _) = test_app();
        let (status, body) = send(&app, Method::GET, "/api/prompts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_returns_201_and_entity() {
        let (app, _) = test_app();

        let created = create(&app, json!({"title": "Greeting", "content": "Hello"})).await;

        assert_eq!(created["title"], "Greeting");
        assert_eq!(created["content"], "Hello");
        assert_eq!(created["createdAt"], "2026-10-19T08:00:00.000Z");
        assert_eq!(created["createdAt"], created["updatedAt"]);
        assert!(created.get("folderId").is_none());

        let (_, list) = send(&app, Method::GET, "/api/prompts", None).await;
        assert_eq!(list, json!([created]));
    }

    #[tokio::test]
    async fn test_create_with_folder() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "t", "content": "c", "folderId": "f-1"})).await;
        assert_eq!(created["folderId"], "f-1");
    }

    #[tokio::test]
    async fn test_create_missing_fields_is_400() {
        let (app, _) = test_app();

        for body in [
            json!({"title": "only title"}),
            json!({"content": "only content"}),
            json!({"title": "", "content": "c"}),
            json!({}),
        ] {
            let (status, err) = send(&app, Method::POST, "/api/prompts", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(err, json!({"error": "Title and content are required"}));
        }
        let (_, list) = send(&app, Method::GET, "/api/prompts", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _) = test_app();
        let (status, err) = send_raw(&app, Method::POST, "/api/prompts", "{\"title\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err, json!({"error": "Invalid request body"}));

        let (status, _) = send_raw(&app, Method::POST, "/api/prompts", "[1, 2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "t", "content": "c"})).await;
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = send(&app, Method::GET, &format!("/api/prompts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, err) = send(&app, Method::GET, "/api/prompts/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err, json!({"error": "Prompt not found"}));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "Greeting", "content": "Hello", "folderId": "f-1"})).await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/prompts/{id}"),
            Some(json!({"title": "X"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "X");
        assert_eq!(updated["content"], "Hello");
        assert_eq!(updated["folderId"], "f-1");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_eq!(updated["updatedAt"], "2026-10-19T08:00:00.001Z");
    }

    #[tokio::test]
    async fn test_update_full_record_echo_and_unfile() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "t", "content": "c", "folderId": "f-1"})).await;
        let id = created["id"].as_str().unwrap();

        // The UI sends the whole record back; id and timestamps are ignored.
        let mut echoed = created.clone();
        echoed["folderId"] = Value::Null;
        echoed["id"] = json!("hijack");
        let (status, updated) =
            send(&app, Method::PUT, &format!("/api/prompts/{id}"), Some(echoed)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert!(updated.get("folderId").is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_is_404() {
        let (app, _) = test_app();
        let (status, err) =
            send(&app, Method::PUT, "/api/prompts/missing", Some(json!({"title": "X"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err, json!({"error": "Prompt not found"}));
    }

    #[tokio::test]
    async fn test_update_blank_title_is_400() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "t", "content": "c"})).await;
        let id = created["id"].as_str().unwrap();

        let (status, _) =
            send(&app, Method::PUT, &format!("/api/prompts/{id}"), Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_raw(&app, Method::PUT, &format!("/api/prompts/{id}"), "nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let (app, _) = test_app();
        let created = create(&app, json!({"title": "t", "content": "c"})).await;
        let uri = format!("/api/prompts/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/api/prompts", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_generic_message() {
        let prompts = Arc::new(MemoryStore::new());
        let app = create_app(test_state_with(prompts.clone(), Arc::new(MemoryStore::new())));
        let created = create(&app, json!({"title": "t", "content": "c"})).await;
        let uri = format!("/api/prompts/{}", created["id"].as_str().unwrap());

        prompts.fail_writes(true);

        let (status, err) = send(&app, Method::PUT, &uri, Some(json!({"title": "X"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err, json!({"error": "Failed to update prompt"}));

        let (status, err) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err, json!({"error": "Failed to delete prompt"}));

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched, created);
    }
}

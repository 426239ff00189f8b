use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::chat::{build_conversation, ChatMessage, ChatSettingsOverride};

#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
    #[serde(default)]
    settings: ChatSettingsOverride,
}

/// POST /api/prompts/{id}/chat
///
/// Streams a completion for `messages` with the prompt as system message.
/// SSE events: `delta` (`{"content": ...}`) per chunk, then either `done`
/// or a single `error` (`{"error": ...}`).
#[tracing::instrument(skip_all, fields(prompt_id = %id))]
pub(crate) async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(body) = body?;
    if body.messages.is_empty() {
        return Err(ApiError::bad_request("At least one message is required"));
    }

    let prompt = state
        .library
        .prompts
        .get(&id)
        .await
        .map_err(|e| ApiError::from_library(e, "Failed to load prompt"))?;

    let settings = state.chat_settings.merged(body.settings);
    let conversation = build_conversation(&prompt.content, body.messages);
    tracing::info!(
        model = %settings.model,
        turns = conversation.len(),
        "relaying chat completion"
    );

    let mut upstream = Box::pin(state.chat_client.stream_completion(settings, conversation));

    let stream = async_stream::stream! {
        let mut chunks = 0usize;
        while let Some(item) = upstream.next().await {
            match item {
                Ok(content) => {
                    chunks += 1;
                    yield Ok(Event::default().event("delta").data(json!({ "content": content }).to_string()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat completion failed");
                    yield Ok(Event::default().event("error").data(json!({ "error": e.to_string() }).to_string()));
                    return;
                }
            }
        }
        tracing::debug!(chunks, "chat completion finished");
        yield Ok(Event::default().event("done").data("[DONE]"));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_app;
    use crate::api::test_support::{send, test_state};
    use crate::chat::ChatSettings;
    use crate::prompts::NewPrompt;

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn test_chat_unknown_prompt_is_404() {
        let app = create_app(test_state());
        let (status, err) = send(
            &app,
            Method::POST,
            "/api/prompts/missing/chat",
            Some(json!({"messages": [{"role": "user", "content": "hi"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err, json!({"error": "Prompt not found"}));
    }

    #[tokio::test]
    async fn test_chat_requires_messages() {
        let app = create_app(test_state());
        let (status, err) =
            send(&app, Method::POST, "/api/prompts/any/chat", Some(json!({"messages": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err, json!({"error": "At least one message is required"}));
    }

    #[tokio::test]
    async fn test_chat_relays_upstream_deltas() {
        let upstream = Router::new().route(
            "/v1/chat/completions",
            post(|axum::Json(body): axum::Json<Value>| async move {
                assert_eq!(body["model"], "override-model");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "Answer in French.");
                assert_eq!(body["messages"][1]["content"], "hello");
                concat!(
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Bon\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"jour\\n!\"}}]}\n\n",
                    "data: [DONE]\n\n",
                )
            }),
        );
        let base_url = spawn_upstream(upstream).await;

        let mut state = test_state();
        state.chat_settings = Arc::new(ChatSettings {
            base_url,
            ..ChatSettings::default()
        });
        let prompt = state
            .library
            .prompts
            .add(NewPrompt {
                title: "French".into(),
                content: "Answer in French.".into(),
                folder_id: None,
            })
            .await
            .unwrap();
        let app = create_app(state);

        let body = json!({
            "messages": [{"role": "user", "content": "hello"}],
            "settings": {"model": "override-model"}
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/prompts/{}/chat", prompt.id))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(text.contains("event: delta\ndata: {\"content\":\"Bon\"}"), "{text}");
        assert!(text.contains("event: delta\ndata: {\"content\":\"jour\\n!\"}"), "{text}");
        assert!(text.contains("event: done\ndata: [DONE]"), "{text}");
        assert!(!text.contains("event: error"), "{text}");
    }

    #[tokio::test]
    async fn test_chat_upstream_failure_becomes_error_event() {
        let upstream = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    axum::Json(json!({"error": {"message": "Rate limit reached"}})),
                )
            }),
        );
        let base_url = spawn_upstream(upstream).await;

        let mut state = test_state();
        state.chat_settings = Arc::new(ChatSettings {
            base_url,
            ..ChatSettings::default()
        });
        let prompt = state
            .library
            .prompts
            .add(NewPrompt {
                title: "t".into(),
                content: "c".into(),
                folder_id: None,
            })
            .await
            .unwrap();
        let app = create_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/prompts/{}/chat", prompt.id))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"messages": [{"role": "user", "content": "hi"}]}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(
            text.contains("event: error\ndata: {\"error\":\"Rate limit reached\"}"),
            "{text}"
        );
        assert!(!text.contains("event: done"), "{text}");
    }
}

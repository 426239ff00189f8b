use std::sync::Arc;

use futures::StreamExt;
use futures::stream::Stream;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::stream::{LineDecoder, StreamLine, parse_line};
use super::{ChatMessage, ChatSettings};

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    #[error("stream interrupted: {0}")]
    Stream(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

pub struct ChatClient {
    http: Arc<reqwest::Client>,
}

impl ChatClient {
    pub fn new(http: Arc<reqwest::Client>) -> Self {
        Self { http }
    }

    /// Start a streamed completion and yield content deltas as they arrive.
    /// The stream ends after `data: [DONE]` or when the upstream closes, and
    /// yields at most one error, as its last item.
    pub fn stream_completion(
        &self,
        settings: ChatSettings,
        messages: Vec<ChatMessage>,
    ) -> impl Stream<Item = Result<String, ChatError>> + Send + use<> {
        let http = self.http.clone();

        async_stream::try_stream! {
            let url = settings.completions_url();
            let mut request = http.post(&url).json(&CompletionRequest {
                model: &settings.model,
                messages: &messages,
                stream: true,
            });
            if !settings.api_key.is_empty() {
                request = request.bearer_auth(&settings.api_key);
            }

            let resp = request
                .send()
                .await
                .map_err(|source| ChatError::Request { url: url.clone(), source })?;

            let status = resp.status();
            let resp = if status.is_success() {
                resp
            } else {
                let body = resp.text().await.unwrap_or_default();
                Err::<(), ChatError>(ChatError::Upstream(upstream_error_message(status, &body)))?;
                unreachable!()
            };

            let mut bytes = Box::pin(resp.bytes_stream());
            let mut decoder = LineDecoder::default();
            let mut finished = false;

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(ChatError::Stream)?;
                for line in decoder.push(&chunk) {
                    match parse_line(&line) {
                        StreamLine::Delta(content) => yield content,
                        StreamLine::Done => finished = true,
                        StreamLine::Skip => {}
                    }
                    if finished {
                        break;
                    }
                }
                if finished {
                    break;
                }
            }

            if !finished {
                if let Some(rest) = decoder.finish() {
                    if let StreamLine::Delta(content) = parse_line(&rest) {
                        yield content;
                    }
                }
            }
        }
    }
}

/// The endpoint's own `error.message` when it sent one, else the status text.
pub fn upstream_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            format!(
                "Error: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )
        })
}

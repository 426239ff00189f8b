//! Relaying a stored prompt to an OpenAI-compatible chat completions
//! endpoint, with the prompt's content as the system message.

pub mod client;
pub mod stream;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// Where and how to reach the completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Per-request settings sent by the UI. Blank values fall back to the
/// server's configured settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettingsOverride {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, alias = "modelName")]
    pub model: Option<String>,
}

impl ChatSettings {
    pub fn merged(&self, overrides: ChatSettingsOverride) -> ChatSettings {
        fn pick(value: Option<String>, fallback: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        }
        ChatSettings {
            base_url: pick(overrides.base_url, &self.base_url),
            api_key: pick(overrides.api_key, &self.api_key),
            model: pick(overrides.model, &self.model),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// `[system: prompt] ++ history`. Any system turns the client sent are
/// dropped so the stored prompt is the only system message.
pub fn build_conversation(system_prompt: &str, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(system_prompt))
        .chain(history.into_iter().filter(|m| m.role != ChatRole::System))
        .collect()
}

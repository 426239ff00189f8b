pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::iso_millis;

/// A titled block of reusable text, optionally filed under a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    /// May point at a folder that no longer exists; readers treat that as unfiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a prompt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// A partial update. `None` leaves the field untouched; for `folder_id`,
/// `Some(None)` (JSON `null`) clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub folder_id: Option<Option<String>>,
}

#[cfg(test)]
impl PromptPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn folder(folder_id: Option<String>) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Default::default()
        }
    }
}

impl PromptPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.folder_id.is_none()
    }

    /// Overwrite the fields this patch names. Timestamps are the caller's job.
    pub fn apply_to(self, prompt: &mut Prompt) {
        if let Some(title) = self.title {
            prompt.title = title;
        }
        if let Some(content) = self.content {
            prompt.content = content;
        }
        if let Some(folder_id) = self.folder_id {
            prompt.folder_id = folder_id;
        }
    }
}

/// Distinguishes a key that is present with `null` from one that is absent:
/// serde only calls this when the key exists.
fn present_or_null<'de, D>(d: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Some)
}

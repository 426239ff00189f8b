pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::iso_millis;

/// A named bucket for prompts. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

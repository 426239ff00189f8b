use std::path::PathBuf;

use crate::chat::{ChatSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::ids::IdFormat;

/// Server configuration loaded from environment variables.
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub id_format: IdFormat,
    pub chat: ChatSettings,
    pub sentry_dsn: Option<String>,
    pub environment: String,
}

/// Unparsed values, one per environment variable.
#[derive(Default)]
pub struct RawConfig<'a> {
    pub port: Option<&'a str>,
    pub data_dir: Option<&'a str>,
    pub static_dir: Option<&'a str>,
    pub id_format: Option<&'a str>,
    pub chat_base_url: Option<&'a str>,
    pub chat_api_key: Option<&'a str>,
    pub chat_model: Option<&'a str>,
    pub sentry_dsn: Option<&'a str>,
    pub environment: Option<&'a str>,
}

impl Config {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        let (port, data_dir, static_dir, id_format) = (
            var("PORT"),
            var("PROMPTDECK_DATA_DIR"),
            var("PROMPTDECK_STATIC_DIR"),
            var("PROMPTDECK_IDS"),
        );
        let (chat_base_url, chat_api_key, chat_model) =
            (var("CHAT_BASE_URL"), var("CHAT_API_KEY"), var("CHAT_MODEL"));
        let (sentry_dsn, environment) = (var("SENTRY_DSN"), var("ENVIRONMENT"));

        Self::from_raw_values(RawConfig {
            port: port.as_deref(),
            data_dir: data_dir.as_deref(),
            static_dir: static_dir.as_deref(),
            id_format: id_format.as_deref(),
            chat_base_url: chat_base_url.as_deref(),
            chat_api_key: chat_api_key.as_deref(),
            chat_model: chat_model.as_deref(),
            sentry_dsn: sentry_dsn.as_deref(),
            environment: environment.as_deref(),
        })
    }

    /// Build a Config from raw string values (as they would come from env vars).
    /// Used directly in tests to avoid mutating process-global environment.
    pub fn from_raw_values(raw: RawConfig<'_>) -> Self {
        let non_empty = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        let port = raw.port.and_then(|v| v.trim().parse().ok()).unwrap_or(8081);

        let data_dir = non_empty(raw.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let static_dir = non_empty(raw.static_dir).map(PathBuf::from);

        let id_format = match non_empty(raw.id_format) {
            None => IdFormat::EpochMillis,
            Some(value) => IdFormat::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "unknown PROMPTDECK_IDS, using epoch ids");
                IdFormat::EpochMillis
            }),
        };

        let chat = ChatSettings {
            base_url: non_empty(raw.chat_base_url)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: non_empty(raw.chat_api_key).unwrap_or_default(),
            model: non_empty(raw.chat_model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let sentry_dsn = non_empty(raw.sentry_dsn);

        let environment = non_empty(raw.environment).unwrap_or_else(|| "local".to_string());

        Config {
            port,
            data_dir,
            static_dir,
            id_format,
            chat,
            sentry_dsn,
            environment,
        }
    }
}

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use uuid::Uuid;

/// Mints ids for new prompts and folders.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Millisecond-epoch ids (`"1760862660123"`), the format existing libraries
/// already contain. Two ids requested within the same millisecond get
/// consecutive values instead of colliding.
#[derive(Default)]
pub struct EpochMillisIds {
    last: AtomicI64,
}

impl EpochMillisIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_after(&self, now_ms: i64) -> i64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

impl IdGenerator for EpochMillisIds {
    fn next_id(&self) -> String {
        self.next_after(Utc::now().timestamp_millis()).to_string()
    }
}

/// Random v4 UUIDs.
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Which generator the server should use, parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    EpochMillis,
    Uuid,
}

impl IdFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "epoch" | "millis" | "timestamp" => Some(Self::EpochMillis),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdFormat::EpochMillis => Box::new(EpochMillisIds::new()),
            IdFormat::Uuid => Box::new(UuidIds),
        }
    }
}

/// Deterministic `"<prefix>-1"`, `"<prefix>-2"`, ... ids for tests.
#[cfg(test)]
pub struct SequentialIds {
    prefix: &'static str,
    next: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl SequentialIds {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

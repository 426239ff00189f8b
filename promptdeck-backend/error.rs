use crate::store::StoreError;

/// What kind of record a [`LibraryError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Prompt,
    Folder,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Prompt => "Prompt",
            EntityKind::Folder => "Folder",
        }
    }
}

/// Outcome of a failed library operation. The HTTP layer maps each variant
/// to exactly one status code.
#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),

    #[error("{} not found: {id}", kind.label())]
    NotFound { kind: EntityKind, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LibraryError {
    pub fn validation(message: impl Into<String>) -> Self {
        LibraryError::Validation(message.into())
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        LibraryError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Reject missing (empty) required text. Whitespace is kept as given.
pub(crate) fn require_text(value: &str, message: &str) -> LibraryResult<()> {
    if value.is_empty() {
        Err(LibraryError::validation(message))
    } else {
        Ok(())
    }
}

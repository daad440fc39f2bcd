use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the rating store.
///
/// Parse and validation failures come from import payloads and never touch
/// stored data. Storage failures come from the disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid backup JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid backup: {0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file at {path} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported store version {found} in {path}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

impl StoreError {
    pub(crate) fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Storage {
            context: context.into(),
            source,
        }
    }

    /// True for problems with an import payload rather than with the store
    pub fn is_import_error(&self) -> bool {
        matches!(self, StoreError::Parse(_) | StoreError::Validation(_))
    }
}

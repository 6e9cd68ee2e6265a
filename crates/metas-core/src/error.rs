// error.rs — Error types for goal validation and storage.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Errors that can occur while creating or reading goals.
#[derive(Debug, Error)]
pub enum MetaError {
    /// One or more submitted fields are missing or invalid. Nothing was written.
    #[error("invalid goal: {0}")]
    Validation(FieldErrors),

    /// The SQLite backend failed (connectivity, constraint, schema).
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The database was written by a newer schema than this binary knows.
    #[error("unsupported schema version {found} (latest supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// The connection mutex was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// The requested goal does not exist.
    #[error("goal not found: {0}")]
    NotFound(i64),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize event data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

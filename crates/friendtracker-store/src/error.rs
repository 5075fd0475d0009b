use friendtracker_shared::ContactError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No contact row with this id.
    #[error("Contact {0} not found")]
    NotFound(i64),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// The payload would violate a contact invariant.
    #[error("Invalid contact: {0}")]
    Invalid(#[from] ContactError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

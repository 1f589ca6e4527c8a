use thiserror::Error;

/// Errors that can occur when interacting with the order ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A payment reference collided with one already stored on another
    /// order. References carry a unique index; callers may retry with a
    /// fresh token.
    #[error("Duplicate payment reference: {reference}")]
    DuplicateReference { reference: String },

    /// A stored row held a value outside the domain (unknown status
    /// string, out-of-range quantity).
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The backing store rejected or failed the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl LedgerError {
    /// True for failures a caller may resolve by retrying the whole
    /// operation (currently only reference collisions).
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::DuplicateReference { .. })
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

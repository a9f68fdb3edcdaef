use thiserror::Error;

/// Errors surfaced by the public directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A create operation found a record with the same key already present.
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    /// An update, delete, or membership lookup referenced a key that does
    /// not exist.
    #[error("'{0}' not found")]
    NotFound(String),

    /// A required key or password was blank. Raised before any store access.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Any failure raised by the store layer, with the cause attached.
    #[error("uncategorized directory failure")]
    Uncategorized(#[from] StoreError),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Failures raised by a [`crate::store::DirectoryStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Save of a record whose key is already present.
    #[error("record '{0}' is already present")]
    DuplicateKey(String),

    /// Update, merge, or delete of a record that is not present.
    #[error("record '{0}' is missing")]
    MissingRecord(String),

    /// Commit or rollback was requested while no unit of work was active.
    #[error("no unit of work is active")]
    NoActiveUnitOfWork,
}

pub(crate) fn require_key(value: &str, what: &str) -> DirectoryResult<()> {
    if value.is_empty() {
        return Err(DirectoryError::Validation(format!("{what} must not be blank")));
    }
    Ok(())
}

use sea_orm::DbErr;
use thiserror::Error;

/// Error types for the store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request cannot be applied as given; `field` names the offending input.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No row with this id is owned by the caller. Deliberately says nothing
    /// about rows owned by someone else.
    #[error("Not found")]
    NotFound,

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

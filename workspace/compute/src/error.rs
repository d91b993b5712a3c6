use model::store::StoreError;
use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the store layer (validation, missing rows, database)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Error from the CSV writer
    #[error("CSV error: {0}")]
    Csv(String),

    /// The export buffer could not be finalized
    #[error("Export error: {0}")]
    Export(String),

    /// Error from date operations
    #[error("Date error: {0}")]
    Date(String),
}

impl From<csv::Error> for ComputeError {
    fn from(error: csv::Error) -> Self {
        let err = ComputeError::Csv(error.to_string());
        error!(?err, "CSV error while writing export");
        err
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;

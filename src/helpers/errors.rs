use axum::{http::StatusCode, response::Json};
use compute::ComputeError;
use model::store::StoreError;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: ErrorResponse) -> ApiError {
    (status, Json(error))
}

/// Maps a store failure onto the HTTP error contract.
///
/// Missing and foreign rows are both reported as a plain "Not found".
pub fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Validation { field, message } => {
            warn!("Validation failed on {}: {}", field, message);
            api_error(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(message, "VALIDATION_ERROR").with_field(field),
            )
        }
        StoreError::NotFound => api_error(
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Not found", "NOT_FOUND"),
        ),
        StoreError::Database(db_error) => {
            error!("Database error: {}", db_error);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error", "DATABASE_ERROR"),
            )
        }
    }
}

pub fn compute_error(err: ComputeError) -> ApiError {
    match err {
        ComputeError::Store(store) => store_error(store),
        ComputeError::Database(db_error) => store_error(StoreError::Database(db_error)),
        ComputeError::Date(message) => {
            warn!("Invalid date input: {}", message);
            api_error(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(message, "VALIDATION_ERROR").with_field("month"),
            )
        }
        ComputeError::Csv(message) | ComputeError::Export(message) => {
            error!("Export failed: {}", message);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Failed to export expenses", "EXPORT_ERROR"),
            )
        }
    }
}

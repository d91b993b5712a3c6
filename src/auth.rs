use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use model::entities::user;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::helpers::errors::{ApiError, api_error};
use crate::schemas::{AppState, ErrorResponse};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    Missing,
    #[error("Invalid token header. Expected 'Token <key>'.")]
    Malformed,
    #[error("Invalid token.")]
    InvalidToken,
}

/// Extracts the key from `Token <key>` (or `Bearer <key>`).
pub fn parse_authorization(header: &str) -> Result<&str, AuthError> {
    let (scheme, key) = header.trim().split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Malformed);
    }
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(AuthError::Malformed);
    }
    Ok(key)
}

fn unauthorized(err: AuthError) -> ApiError {
    api_error(
        StatusCode::UNAUTHORIZED,
        ErrorResponse::new(err.to_string(), "UNAUTHORIZED"),
    )
}

/// The user a request is made on behalf of.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| unauthorized(AuthError::Missing))?
            .to_str()
            .map_err(|_| unauthorized(AuthError::Malformed))?;
        let token = parse_authorization(header).map_err(unauthorized)?;

        match user::Model::find_by_token(&state.db, token).await {
            Ok(Some(user)) => {
                debug!("Request authenticated as user {}", user.id);
                Ok(AuthUser(user))
            }
            Ok(None) => {
                warn!("Rejected request with unknown token");
                Err(unauthorized(AuthError::InvalidToken))
            }
            Err(db_error) => {
                error!("Failed to resolve API token: {}", db_error);
                Err(api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error", "DATABASE_ERROR"),
                ))
            }
        }
    }
}

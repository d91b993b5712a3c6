use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::user;
use model::store::users;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::helpers::errors::{ApiError, store_error};
use crate::helpers::validation::Checked;
use crate::schemas::{ApiResponse, AppState};

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150))]
    pub username: String,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

/// Returned once, on creation; the token is not shown again
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserResponse {
    pub id: i32,
    pub username: String,
    /// Send as `Authorization: Token <api_token>`
    pub api_token: String,
}

impl From<user::Model> for CreatedUserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            api_token: model.api_token,
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<CreatedUserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_user(
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedUserResponse>>), ApiError> {
    trace!("Entering create_user function");
    debug!("Creating user with username: {}", request.username);

    let user = users::create(&state.db, &request.username)
        .await
        .map_err(store_error)?;

    info!("User created successfully with ID: {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            CreatedUserResponse::from(user),
            "User created successfully",
        )),
    ))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("token" = [])),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(user), fields(user_id = user.id))]
pub async fn get_current_user(
    AuthUser(user): AuthUser,
) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(
        UserResponse::from(user),
        "User retrieved successfully",
    ))
}

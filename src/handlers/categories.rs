use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{TransactionKind, category};
use model::store::categories;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::AuthUser;
use crate::helpers::errors::{ApiError, store_error};
use crate::helpers::validation::Checked;
use crate::schemas::{ApiResponse, AppState};

/// Query parameters for listing categories
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
pub struct CategoryListQuery {
    /// Only categories of this type (EXPENSE or INCOME)
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub transaction_type: Option<TransactionKind>,
}

/// Request body for creating a personal category
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// EXPENSE or INCOME; cannot be changed later
    #[schema(value_type = String, example = "EXPENSE")]
    pub transaction_type: TransactionKind,
}

/// Request body for renaming a category
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "EXPENSE")]
    pub transaction_type: TransactionKind,
    /// True for categories available to every user
    pub shared: bool,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            shared: model.owner() == category::Owner::Shared,
            id: model.id,
            name: model.name,
            transaction_type: model.transaction_type,
            created_at: model.created_at,
        }
    }
}

/// List the categories the caller can use
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(CategoryListQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_categories(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<CategoryListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    trace!("Entering get_categories function");

    let categories = categories::list(&state.db, user.id, query.transaction_type)
        .await
        .map_err(store_error)?;
    debug!("Retrieved {} categories", categories.len());

    Ok(Json(ApiResponse::ok(
        categories.into_iter().map(CategoryResponse::from).collect(),
        "Categories retrieved successfully",
    )))
}

/// Create a personal category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    security(("token" = [])),
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request or duplicate name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn create_category(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<CreateCategoryRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiError> {
    let category = categories::create(&state.db, user.id, &request.name, request.transaction_type)
        .await
        .map_err(store_error)?;

    info!("Category created with ID: {}", category.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            CategoryResponse::from(category),
            "Category created successfully",
        )),
    ))
}

/// Rename one of the caller's categories
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    request_body = UpdateCategoryRequest,
    security(("token" = [])),
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request or duplicate name", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn update_category(
    AuthUser(user): AuthUser,
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<UpdateCategoryRequest>>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let category = categories::update(&state.db, category_id, user.id, &request.name)
        .await
        .map_err(store_error)?;

    Ok(Json(ApiResponse::ok(
        CategoryResponse::from(category),
        "Category updated successfully",
    )))
}

/// Delete one of the caller's categories
///
/// Transactions labelled with it become uncategorized; budgets on it are removed.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_category(
    AuthUser(user): AuthUser,
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    categories::delete(&state.db, category_id, user.id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

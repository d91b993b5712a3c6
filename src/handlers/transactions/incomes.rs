use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::IncomeTotal;
use compute::TotalsComputer;
use model::entities::TransactionKind;
use tracing::{debug, instrument};

use super::{
    CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest, create_record,
    delete_record, get_record, list_records, update_record,
};
use crate::auth::AuthUser;
use crate::helpers::errors::{ApiError, compute_error};
use crate::helpers::filters::date_filters;
use crate::helpers::validation::Checked;
use crate::schemas::{ApiResponse, AppState, DateRangeQuery};

const KIND: TransactionKind = TransactionKind::Income;

/// List the caller's incomes, newest first
#[utoipa::path(
    get,
    path = "/api/v1/incomes",
    tag = "incomes",
    params(DateRangeQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "Incomes retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_incomes(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<DateRangeQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, ApiError> {
    list_records(&state, user.id, KIND, &query).await
}

/// Record an income
#[utoipa::path(
    post,
    path = "/api/v1/incomes",
    tag = "incomes",
    request_body = CreateTransactionRequest,
    security(("token" = [])),
    responses(
        (status = 201, description = "Income created successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn create_income(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<CreateTransactionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), ApiError> {
    create_record(&state, user.id, KIND, request).await
}

/// Get one of the caller's incomes
#[utoipa::path(
    get,
    path = "/api/v1/incomes/{income_id}",
    tag = "incomes",
    params(
        ("income_id" = i32, Path, description = "Income ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 200, description = "Income retrieved successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_income(
    AuthUser(user): AuthUser,
    Path(income_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    get_record(&state, income_id, user.id, KIND).await
}

/// Update one of the caller's incomes
#[utoipa::path(
    put,
    path = "/api/v1/incomes/{income_id}",
    tag = "incomes",
    params(
        ("income_id" = i32, Path, description = "Income ID"),
    ),
    request_body = UpdateTransactionRequest,
    security(("token" = [])),
    responses(
        (status = 200, description = "Income updated successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn update_income(
    AuthUser(user): AuthUser,
    Path(income_id): Path<i32>,
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<UpdateTransactionRequest>>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    update_record(&state, income_id, user.id, KIND, request).await
}

/// Delete one of the caller's incomes
#[utoipa::path(
    delete,
    path = "/api/v1/incomes/{income_id}",
    tag = "incomes",
    params(
        ("income_id" = i32, Path, description = "Income ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 204, description = "Income deleted successfully"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_income(
    AuthUser(user): AuthUser,
    Path(income_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    delete_record(&state, income_id, user.id, KIND).await
}

/// Sum of the caller's incomes
#[utoipa::path(
    get,
    path = "/api/v1/incomes/total",
    tag = "incomes",
    params(DateRangeQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "Total computed successfully", body = ApiResponse<IncomeTotal>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_total_incomes(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<DateRangeQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<IncomeTotal>>, ApiError> {
    let filters = date_filters(&query)?;
    let total = TotalsComputer::new()
        .total(&state.db, user.id, KIND, &filters)
        .await
        .map_err(compute_error)?;
    debug!("Income total for user {}: {}", user.id, total);

    Ok(Json(ApiResponse::ok(
        IncomeTotal {
            total_incomes: total,
        },
        "Total computed successfully",
    )))
}

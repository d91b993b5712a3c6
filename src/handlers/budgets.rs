use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::BudgetProgress;
use compute::BudgetProgressComputer;
use model::store::budgets::{self, BudgetRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::helpers::errors::{ApiError, compute_error, store_error};
use crate::helpers::filters::budget_month;
use crate::helpers::validation::Checked;
use crate::schemas::{ApiResponse, AppState, MonthQuery};

/// Request body for setting a category's monthly limit
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpsertBudgetRequest {
    /// Expense category ID
    pub category: i32,
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
}

/// Budget response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: i32,
    pub category: i32,
    pub category_name: String,
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
}

impl From<BudgetRecord> for BudgetResponse {
    fn from(record: BudgetRecord) -> Self {
        Self {
            id: record.budget.id,
            category: record.budget.category_id,
            category_name: record.category.name,
            amount: record.budget.amount,
        }
    }
}

/// List the caller's budgets
#[utoipa::path(
    get,
    path = "/api/v1/budgets",
    tag = "budgets",
    security(("token" = [])),
    responses(
        (status = 200, description = "Budgets retrieved successfully", body = ApiResponse<Vec<BudgetResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_budgets(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetResponse>>>, ApiError> {
    let budgets = budgets::list(&state.db, user.id)
        .await
        .map_err(store_error)?;
    debug!("Retrieved {} budgets", budgets.len());

    Ok(Json(ApiResponse::ok(
        budgets.into_iter().map(BudgetResponse::from).collect(),
        "Budgets retrieved successfully",
    )))
}

/// Set the limit for a category, creating the budget if needed
#[utoipa::path(
    post,
    path = "/api/v1/budgets",
    tag = "budgets",
    request_body = UpsertBudgetRequest,
    security(("token" = [])),
    responses(
        (status = 201, description = "Budget created", body = ApiResponse<BudgetResponse>),
        (status = 200, description = "Budget updated", body = ApiResponse<BudgetResponse>),
        (status = 400, description = "Invalid category or amount", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn upsert_budget(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Checked(Json(request)): Checked<Json<UpsertBudgetRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), ApiError> {
    let outcome = budgets::upsert(&state.db, user.id, request.category, request.amount)
        .await
        .map_err(store_error)?;

    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Budget created successfully")
    } else {
        (StatusCode::OK, "Budget updated successfully")
    };
    info!("{} (ID: {})", message, outcome.record.budget.id);
    Ok((
        status,
        Json(ApiResponse::ok(BudgetResponse::from(outcome.record), message)),
    ))
}

/// Delete one of the caller's budgets
#[utoipa::path(
    delete,
    path = "/api/v1/budgets/{budget_id}",
    tag = "budgets",
    params(
        ("budget_id" = i32, Path, description = "Budget ID"),
    ),
    security(("token" = [])),
    responses(
        (status = 204, description = "Budget deleted successfully"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_budget(
    AuthUser(user): AuthUser,
    Path(budget_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    budgets::delete(&state.db, budget_id, user.id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Spending against each budget for one month
#[utoipa::path(
    get,
    path = "/api/v1/budgets/progress",
    tag = "budgets",
    params(MonthQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "Budget progress computed successfully", body = ApiResponse<Vec<BudgetProgress>>),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_budget_progress(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<MonthQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetProgress>>>, ApiError> {
    let month = budget_month(&query)?;
    let progress = BudgetProgressComputer::for_month(month)
        .compute(&state.db, user.id)
        .await
        .map_err(compute_error)?;

    Ok(Json(ApiResponse::ok(
        progress,
        "Budget progress computed successfully",
    )))
}

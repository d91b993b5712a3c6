use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use common::{Analytics, Summary, SummaryStats};
use compute::{AnalyticsComputer, EXPORT_FILENAME, TotalsComputer, export_expenses};
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::helpers::errors::{ApiError, compute_error};
use crate::helpers::filters::date_filters;
use crate::helpers::validation::Checked;
use crate::schemas::{ApiResponse, AppState, DateRangeQuery};

/// Income, expense and net income over all of the caller's records
#[utoipa::path(
    get,
    path = "/api/v1/summary",
    tag = "reports",
    security(("token" = [])),
    responses(
        (status = 200, description = "Summary computed successfully", body = ApiResponse<Summary>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_summary(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Summary>>, ApiError> {
    let summary = TotalsComputer::new()
        .summary(&state.db, user.id)
        .await
        .map_err(compute_error)?;
    Ok(Json(ApiResponse::ok(summary, "Summary computed successfully")))
}

/// Expense totals per category and per month
#[utoipa::path(
    get,
    path = "/api/v1/expenses/analytics",
    tag = "reports",
    security(("token" = [])),
    responses(
        (status = 200, description = "Analytics computed successfully", body = ApiResponse<Analytics>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_expense_analytics(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Analytics>>, ApiError> {
    let analytics = AnalyticsComputer::new()
        .analytics(&state.db, user.id)
        .await
        .map_err(compute_error)?;
    Ok(Json(ApiResponse::ok(
        analytics,
        "Analytics computed successfully",
    )))
}

/// Total, count, average and category split of the filtered expenses
#[utoipa::path(
    get,
    path = "/api/v1/expenses/summary-stats",
    tag = "reports",
    params(DateRangeQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "Statistics computed successfully", body = ApiResponse<SummaryStats>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_expense_summary_stats(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<DateRangeQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SummaryStats>>, ApiError> {
    let filters = date_filters(&query)?;
    let stats = AnalyticsComputer::new()
        .summary_stats(&state.db, user.id, &filters)
        .await
        .map_err(compute_error)?;
    Ok(Json(ApiResponse::ok(
        stats,
        "Statistics computed successfully",
    )))
}

/// Download the filtered expenses as CSV
#[utoipa::path(
    get,
    path = "/api/v1/expenses/export",
    tag = "reports",
    params(DateRangeQuery),
    security(("token" = [])),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Export failed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn export_expenses_csv(
    AuthUser(user): AuthUser,
    Checked(Query(query)): Checked<Query<DateRangeQuery>>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let filters = date_filters(&query)?;
    let document = export_expenses(&state.db, user.id, &filters)
        .await
        .map_err(compute_error)?;

    info!("Sending {} bytes of CSV", document.len());
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    ))
}

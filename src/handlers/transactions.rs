//! Expense and income endpoints. Both resources share one store and differ
//! only in the `TransactionKind` they pass down; the per-resource modules hold
//! the routed, documented handlers.

pub mod expenses;
pub mod incomes;

use axum::{http::StatusCode, response::Json};
use chrono::NaiveDate;
use model::entities::TransactionKind;
use model::store::transactions::{
    self, NewTransaction, TransactionChanges, TransactionRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use crate::helpers::errors::{ApiError, store_error};
use crate::helpers::filters::date_filters;
use crate::schemas::{ApiResponse, AppState, DateRangeQuery};

/// Request body for recording an expense or income
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Decimal with at most two fractional digits
    #[schema(value_type = String, example = "4.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Category ID; must match the resource's type
    pub category: Option<i32>,
}

/// Request body for updating an expense or income. Omitted fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTransactionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    /// `null` removes the category
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub category: Option<Option<i32>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

impl From<UpdateTransactionRequest> for TransactionChanges {
    fn from(request: UpdateTransactionRequest) -> Self {
        Self {
            title: request.title,
            amount: request.amount,
            date: request.date,
            category_id: request.category,
        }
    }
}

/// Expense or income response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub title: String,
    #[schema(value_type = String, example = "4.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<i32>,
    pub category_name: Option<String>,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        let category_name = record.category_name().map(str::to_string);
        Self {
            id: record.transaction.id,
            title: record.transaction.title,
            amount: record.transaction.amount,
            date: record.transaction.date,
            category: record.transaction.category_id,
            category_name,
        }
    }
}

fn noun(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    }
}

pub(crate) async fn list_records(
    state: &AppState,
    user_id: i32,
    kind: TransactionKind,
    query: &DateRangeQuery,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, ApiError> {
    let filters = date_filters(query)?;
    let records = transactions::list(&state.db, user_id, kind, &filters)
        .await
        .map_err(store_error)?;
    debug!("Retrieved {} {} records", records.len(), kind);

    Ok(Json(ApiResponse::ok(
        records.into_iter().map(TransactionResponse::from).collect(),
        format!("{}s retrieved successfully", noun(kind)),
    )))
}

pub(crate) async fn get_record(
    state: &AppState,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let record = transactions::get(&state.db, id, user_id, kind)
        .await
        .map_err(store_error)?;
    Ok(Json(ApiResponse::ok(
        TransactionResponse::from(record),
        format!("{} retrieved successfully", noun(kind)),
    )))
}

pub(crate) async fn create_record(
    state: &AppState,
    user_id: i32,
    kind: TransactionKind,
    request: CreateTransactionRequest,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), ApiError> {
    let new = NewTransaction {
        title: request.title,
        amount: request.amount,
        date: request.date,
        category_id: request.category,
    };
    let record = transactions::create(&state.db, user_id, kind, new)
        .await
        .map_err(store_error)?;

    info!("{} created with ID: {}", noun(kind), record.transaction.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            TransactionResponse::from(record),
            format!("{} created successfully", noun(kind)),
        )),
    ))
}

pub(crate) async fn update_record(
    state: &AppState,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
    request: UpdateTransactionRequest,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let record = transactions::update(&state.db, id, user_id, kind, request.into())
        .await
        .map_err(store_error)?;
    Ok(Json(ApiResponse::ok(
        TransactionResponse::from(record),
        format!("{} updated successfully", noun(kind)),
    )))
}

pub(crate) async fn delete_record(
    state: &AppState,
    id: i32,
    user_id: i32,
    kind: TransactionKind,
) -> Result<StatusCode, ApiError> {
    transactions::delete(&state.db, id, user_id, kind)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

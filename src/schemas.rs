use chrono::NaiveDate;
use common::{
    Analytics, BudgetProgress, CategoryTotal, ExpenseTotal, IncomeTotal, MonthTotal, Summary,
    SummaryStats,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use validator::Validate;

pub use common::ApiResponse;

use crate::handlers::budgets::{BudgetResponse, UpsertBudgetRequest};
use crate::handlers::categories::{
    CategoryListQuery, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::handlers::transactions::{
    CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest,
};
use crate::handlers::users::{CreateUserRequest, CreatedUserResponse, UserResponse};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// Optional inclusive date range (YYYY-MM-DD)
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
pub struct DateRangeQuery {
    /// First day included
    pub start_date: Option<NaiveDate>,
    /// Last day included
    pub end_date: Option<NaiveDate>,
}

/// Month selection for budget progress; both default to the current month
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
pub struct MonthQuery {
    /// Year (e.g., 2024)
    #[validate(range(min = 1970, max = 9999))]
    pub year: Option<i32>,
    /// Month (1-12)
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Offending request field, for validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            field: None,
            success: false,
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct TokenAuth;

impl Modify for TokenAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token <api_token>",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_current_user,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::transactions::expenses::get_expenses,
        crate::handlers::transactions::expenses::create_expense,
        crate::handlers::transactions::expenses::get_expense,
        crate::handlers::transactions::expenses::update_expense,
        crate::handlers::transactions::expenses::delete_expense,
        crate::handlers::transactions::expenses::get_total_expenses,
        crate::handlers::transactions::incomes::get_incomes,
        crate::handlers::transactions::incomes::create_income,
        crate::handlers::transactions::incomes::get_income,
        crate::handlers::transactions::incomes::update_income,
        crate::handlers::transactions::incomes::delete_income,
        crate::handlers::transactions::incomes::get_total_incomes,
        crate::handlers::budgets::get_budgets,
        crate::handlers::budgets::upsert_budget,
        crate::handlers::budgets::delete_budget,
        crate::handlers::budgets::get_budget_progress,
        crate::handlers::reports::get_summary,
        crate::handlers::reports::get_expense_analytics,
        crate::handlers::reports::get_expense_summary_stats,
        crate::handlers::reports::export_expenses_csv,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<CreatedUserResponse>,
            ApiResponse<Vec<CategoryResponse>>,
            ApiResponse<CategoryResponse>,
            ApiResponse<Vec<TransactionResponse>>,
            ApiResponse<TransactionResponse>,
            ApiResponse<Vec<BudgetResponse>>,
            ApiResponse<BudgetResponse>,
            ApiResponse<Vec<BudgetProgress>>,
            ApiResponse<ExpenseTotal>,
            ApiResponse<IncomeTotal>,
            ApiResponse<Summary>,
            ApiResponse<Analytics>,
            ApiResponse<SummaryStats>,
            ErrorResponse,
            HealthResponse,
            DateRangeQuery,
            MonthQuery,
            CreateUserRequest,
            UserResponse,
            CreatedUserResponse,
            CategoryListQuery,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryResponse,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            TransactionResponse,
            UpsertBudgetRequest,
            BudgetResponse,
            BudgetProgress,
            ExpenseTotal,
            IncomeTotal,
            Summary,
            Analytics,
            CategoryTotal,
            MonthTotal,
            SummaryStats,
        )
    ),
    modifiers(&TokenAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User provisioning"),
        (name = "categories", description = "Shared and personal categories"),
        (name = "expenses", description = "Expense records"),
        (name = "incomes", description = "Income records"),
        (name = "budgets", description = "Monthly per-category budgets"),
        (name = "reports", description = "Totals, analytics and CSV export"),
    ),
    info(
        title = "Spendwise API",
        description = "Personal finance tracker API - expenses, incomes, categories and budgets",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

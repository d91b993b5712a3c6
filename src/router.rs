use crate::handlers::{
    budgets::{delete_budget, get_budget_progress, get_budgets, upsert_budget},
    categories::{create_category, delete_category, get_categories, update_category},
    health::health_check,
    reports::{export_expenses_csv, get_expense_analytics, get_expense_summary_stats, get_summary},
    transactions::{
        expenses::{
            create_expense, delete_expense, get_expense, get_expenses, get_total_expenses,
            update_expense,
        },
        incomes::{
            create_income, delete_income, get_income, get_incomes, get_total_incomes,
            update_income,
        },
    },
    users::{create_user, get_current_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Users
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/me", get(get_current_user))
        // Categories
        .route("/api/v1/categories", get(get_categories).post(create_category))
        .route(
            "/api/v1/categories/:category_id",
            put(update_category).delete(delete_category),
        )
        // Expenses and their reports
        .route("/api/v1/expenses", get(get_expenses).post(create_expense))
        .route("/api/v1/expenses/total", get(get_total_expenses))
        .route("/api/v1/expenses/analytics", get(get_expense_analytics))
        .route("/api/v1/expenses/summary-stats", get(get_expense_summary_stats))
        .route("/api/v1/expenses/export", get(export_expenses_csv))
        .route(
            "/api/v1/expenses/:expense_id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        // Incomes
        .route("/api/v1/incomes", get(get_incomes).post(create_income))
        .route("/api/v1/incomes/total", get(get_total_incomes))
        .route(
            "/api/v1/incomes/:income_id",
            get(get_income).put(update_income).delete(delete_income),
        )
        // Reports
        .route("/api/v1/summary", get(get_summary))
        // Budgets
        .route("/api/v1/budgets", get(get_budgets).post(upsert_budget))
        .route("/api/v1/budgets/progress", get(get_budget_progress))
        .route("/api/v1/budgets/:budget_id", delete(delete_budget))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

//! Common transport-layer types for the reporting endpoints.
//! The aggregation engine produces these and the HTTP layer serializes them
//! as-is, so both sides agree on one shape.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

// ===================== Totals =====================

/// Sum of the caller's expenses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseTotal {
    #[schema(value_type = String)]
    pub total_expenses: Decimal,
}

/// Sum of the caller's incomes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct IncomeTotal {
    #[schema(value_type = String)]
    pub total_incomes: Decimal,
}

/// Income against expense over all of the caller's transactions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Summary {
    #[schema(value_type = String)]
    pub total_income: Decimal,
    #[schema(value_type = String)]
    pub total_expense: Decimal,
    #[schema(value_type = String)]
    pub net_income: Decimal,
}

impl Summary {
    pub fn new(total_income: Decimal, total_expense: Decimal) -> Self {
        Self {
            total_income,
            total_expense,
            net_income: total_income - total_expense,
        }
    }
}

// ===================== Analytics =====================

/// Expense sum for one category. `category` is `None` for uncategorized rows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryTotal {
    pub category: Option<String>,
    #[schema(value_type = String)]
    pub total: Decimal,
}

/// Expense sum for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    #[schema(value_type = String)]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct Analytics {
    /// Largest total first
    pub by_category: Vec<CategoryTotal>,
    /// Chronological
    pub by_month: Vec<MonthTotal>,
}

/// Totals over a filtered set of expenses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SummaryStats {
    #[schema(value_type = String)]
    pub total: Decimal,
    pub count: u64,
    /// Mean amount rounded to cents, zero when there are no rows
    #[schema(value_type = String)]
    pub average: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

impl SummaryStats {
    pub fn empty() -> Self {
        let zero = Decimal::new(0, 2);
        Self {
            total: zero,
            count: 0,
            average: zero,
            by_category: Vec::new(),
        }
    }
}

// ===================== Budgets =====================

/// How much of one budget has been used in a month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetProgress {
    /// Budget id
    pub id: i32,
    pub category_id: i32,
    pub category: String,
    #[schema(value_type = String)]
    pub budget_limit: Decimal,
    /// Expenses booked against the category in the month
    #[serde(rename = "actual_limit")]
    #[schema(value_type = String)]
    pub spent: Decimal,
    #[schema(value_type = String)]
    pub remaining: Decimal,
    /// Percentage of the limit used, one decimal place
    pub percent: f64,
}

use chrono::{Datelike, Utc};
use common::BudgetProgress;
use model::entities::TransactionKind;
use model::store::{Filters, budgets, money, transactions};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};

/// The calendar month budget usage is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetMonth {
    year: i32,
    month: u32,
    filters: Filters,
}

impl BudgetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let filters = Filters::for_month(year, month)
            .ok_or_else(|| ComputeError::Date(format!("Invalid month {}-{:02}", year, month)))?;
        Ok(Self {
            year,
            month,
            filters,
        })
    }

    /// The month containing today's UTC date.
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        let filters = Filters::for_month(today.year(), today.month()).unwrap_or(Filters {
            start_date: Some(today),
            end_date: Some(today),
        });
        Self {
            year: today.year(),
            month: today.month(),
            filters,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }
}

/// Share of `limit` used by `spent`, in percent with one decimal place.
///
/// Zero when the limit is not positive.
pub fn percent_used(spent: Decimal, limit: Decimal) -> f64 {
    if limit <= Decimal::ZERO {
        return 0.0;
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent.round_dp(1))
        .and_then(|percent| percent.to_f64())
        .unwrap_or(0.0)
}

/// A computer that compares each budget against the month's expenses in its category.
#[derive(Debug)]
pub struct BudgetProgressComputer {
    month: BudgetMonth,
}

impl Default for BudgetProgressComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetProgressComputer {
    /// Measures the current month.
    pub fn new() -> Self {
        Self::for_month(BudgetMonth::current())
    }

    pub fn for_month(month: BudgetMonth) -> Self {
        Self { month }
    }

    /// One entry per budget of the user, ordered by category name.
    #[instrument(skip(self, db), fields(year = self.month.year, month = self.month.month))]
    pub async fn compute(&self, db: &DatabaseConnection, user_id: i32) -> Result<Vec<BudgetProgress>> {
        let budgets = budgets::list(db, user_id).await?;
        if budgets.is_empty() {
            debug!("User {} has no budgets", user_id);
            return Ok(Vec::new());
        }

        let expenses = transactions::list(
            db,
            user_id,
            TransactionKind::Expense,
            self.month.filters(),
        )
        .await?;

        let mut spent_by_category: HashMap<i32, Decimal> = HashMap::new();
        for expense in &expenses {
            if let Some(category_id) = expense.transaction.category_id {
                *spent_by_category.entry(category_id).or_insert(Decimal::ZERO) +=
                    expense.transaction.amount;
            }
        }

        let progress: Vec<BudgetProgress> = budgets
            .into_iter()
            .map(|record| {
                let limit = record.budget.amount;
                let spent = money(
                    spent_by_category
                        .get(&record.budget.category_id)
                        .copied()
                        .unwrap_or(Decimal::ZERO),
                );
                BudgetProgress {
                    id: record.budget.id,
                    category_id: record.budget.category_id,
                    category: record.category.name,
                    budget_limit: limit,
                    spent,
                    remaining: money(limit - spent),
                    percent: percent_used(spent, limit),
                }
            })
            .collect();

        info!(
            "Computed progress for {} budgets of user {} over {} expenses",
            progress.len(),
            user_id,
            expenses.len()
        );
        Ok(progress)
    }
}

use common::{Analytics, CategoryTotal, MonthTotal, SummaryStats};
use model::entities::TransactionKind;
use model::store::transactions::{self, TransactionRecord};
use model::store::{Filters, money, year_month};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::totals::sum_amounts;

/// Sums per category name; uncategorized rows share the `None` bucket.
///
/// Ordered by total descending, ties broken by name with `None` last.
pub fn group_by_category(records: &[TransactionRecord]) -> Vec<CategoryTotal> {
    let mut grouped: HashMap<Option<&str>, Decimal> = HashMap::new();
    for record in records {
        *grouped.entry(record.category_name()).or_insert(Decimal::ZERO) +=
            record.transaction.amount;
    }

    let mut totals: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            category: name.map(str::to_string),
            total: money(total),
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total.cmp(&a.total).then_with(|| match (&a.category, &b.category) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });
    totals
}

/// Sums per calendar month, oldest first.
pub fn group_by_month(records: &[TransactionRecord]) -> Vec<MonthTotal> {
    let mut grouped: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for record in records {
        *grouped
            .entry(year_month(record.transaction.date))
            .or_insert(Decimal::ZERO) += record.transaction.amount;
    }

    grouped
        .into_iter()
        .map(|((year, month), total)| MonthTotal {
            year,
            month,
            total: money(total),
        })
        .collect()
}

/// Mean rounded to cents, zero for an empty set.
pub fn average(total: Decimal, count: u64) -> Decimal {
    if count == 0 {
        return money(Decimal::ZERO);
    }
    money(total / Decimal::from(count))
}

/// A computer that breaks a user's expenses down by category and month.
#[derive(Debug, Default)]
pub struct AnalyticsComputer;

impl AnalyticsComputer {
    /// Creates a new AnalyticsComputer instance.
    pub fn new() -> Self {
        Self
    }

    /// Expense totals per category and per month over all of the user's expenses.
    #[instrument(skip(self, db))]
    pub async fn analytics(&self, db: &DatabaseConnection, user_id: i32) -> Result<Analytics> {
        let expenses =
            transactions::list(db, user_id, TransactionKind::Expense, &Filters::all()).await?;

        let analytics = Analytics {
            by_category: group_by_category(&expenses),
            by_month: group_by_month(&expenses),
        };
        info!(
            "Analytics for user {}: {} categories over {} months",
            user_id,
            analytics.by_category.len(),
            analytics.by_month.len()
        );
        Ok(analytics)
    }

    /// Total, count, average and per-category totals of the filtered expenses.
    #[instrument(skip(self, db))]
    pub async fn summary_stats(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        filters: &Filters,
    ) -> Result<SummaryStats> {
        let expenses = transactions::list(db, user_id, TransactionKind::Expense, filters).await?;
        if expenses.is_empty() {
            debug!("No expenses for user {}, returning empty stats", user_id);
            return Ok(SummaryStats::empty());
        }

        let total = sum_amounts(&expenses);
        let count = expenses.len() as u64;
        Ok(SummaryStats {
            total,
            count,
            average: average(total, count),
            by_category: group_by_category(&expenses),
        })
    }
}

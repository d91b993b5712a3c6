use common::Summary;
use model::entities::TransactionKind;
use model::store::transactions::{self, TransactionRecord};
use model::store::{Filters, money};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

use crate::error::Result;

/// Sums amounts, giving `0.00` for no rows.
pub fn sum_amounts<'a>(records: impl IntoIterator<Item = &'a TransactionRecord>) -> Decimal {
    money(
        records
            .into_iter()
            .map(|r| r.transaction.amount)
            .sum::<Decimal>(),
    )
}

/// A computer that totals a user's transactions.
#[derive(Debug, Default)]
pub struct TotalsComputer;

impl TotalsComputer {
    /// Creates a new TotalsComputer instance.
    pub fn new() -> Self {
        Self
    }

    /// Sum of the user's transactions of `kind` matching `filters`.
    #[instrument(skip(self, db))]
    pub async fn total(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        kind: TransactionKind,
        filters: &Filters,
    ) -> Result<Decimal> {
        let records = transactions::list(db, user_id, kind, filters).await?;
        let total = sum_amounts(&records);
        debug!("Total {} over {} rows: {}", kind, records.len(), total);
        Ok(total)
    }

    /// Income, expense and their difference over all of the user's rows.
    #[instrument(skip(self, db))]
    pub async fn summary(&self, db: &DatabaseConnection, user_id: i32) -> Result<Summary> {
        let all = Filters::all();
        let income = self.total(db, user_id, TransactionKind::Income, &all).await?;
        let expense = self.total(db, user_id, TransactionKind::Expense, &all).await?;

        let summary = Summary::new(income, expense);
        info!(
            "Summary for user {}: income {}, expense {}, net {}",
            user_id, summary.total_income, summary.total_expense, summary.net_income
        );
        Ok(summary)
    }
}

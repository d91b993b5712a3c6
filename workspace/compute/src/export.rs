//! CSV export of a user's expenses.

use model::entities::TransactionKind;
use model::store::transactions::{self, TransactionRecord};
use model::store::{Filters, money};
use sea_orm::DatabaseConnection;
use std::io::Write;
use tracing::{info, instrument};

use crate::error::{ComputeError, Result};

/// File name offered to the client.
pub const EXPORT_FILENAME: &str = "expenses.csv";

pub const EXPORT_HEADER: [&str; 4] = ["Date", "Title", "Category", "Amount"];

/// Shown in the category column of uncategorized expenses.
pub const NO_CATEGORY: &str = "N/A";

/// Writes one row per record after the header, in the order given.
pub fn write_expenses_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<W> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(EXPORT_HEADER)?;
    for record in records {
        let date = record.transaction.date.format("%Y-%m-%d").to_string();
        let amount = money(record.transaction.amount).to_string();
        wtr.write_record([
            date.as_str(),
            record.transaction.title.as_str(),
            record.category_name().unwrap_or(NO_CATEGORY),
            amount.as_str(),
        ])?;
    }

    wtr.into_inner()
        .map_err(|e| ComputeError::Export(e.error().to_string()))
}

/// Renders the records as a CSV document.
pub fn expenses_csv(records: &[TransactionRecord]) -> Result<String> {
    let bytes = write_expenses_csv(records, Vec::new())?;
    String::from_utf8(bytes).map_err(|e| ComputeError::Export(e.to_string()))
}

/// Exports the user's expenses matching `filters`, newest first.
#[instrument(skip(db))]
pub async fn export_expenses(
    db: &DatabaseConnection,
    user_id: i32,
    filters: &Filters,
) -> Result<String> {
    let expenses = transactions::list(db, user_id, TransactionKind::Expense, filters).await?;
    let document = expenses_csv(&expenses)?;
    info!("Exported {} expenses for user {}", expenses.len(), user_id);
    Ok(document)
}

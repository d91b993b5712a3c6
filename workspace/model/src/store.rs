//! Per-user persistence operations over the entities.
//!
//! Every function takes the caller's user id explicitly and restricts its
//! queries to rows that user may see; nothing here trusts an earlier read.

pub mod budgets;
pub mod categories;
mod error;
#[cfg(test)]
pub(crate) mod testing;
pub mod transactions;
pub mod users;

pub use error::{Result, StoreError};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition};

use crate::entities::transaction;

/// Largest number of digits an amount may carry, fractional digits included.
pub const AMOUNT_MAX_DIGITS: u32 = 10;
/// Fractional digits kept for every amount.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Optional inclusive date range applied to transaction queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Filters {
    /// No restriction at all.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter, rejecting ranges that end before they start.
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(StoreError::validation(
                    "start_date",
                    "start_date must be before or equal to end_date",
                ));
            }
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The calendar month containing `year`/`month`, or `None` for an invalid month.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self {
            start_date: Some(first),
            end_date: Some(last),
        })
    }

    /// Same bounds as the SQL condition, for in-memory checks.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    pub(crate) fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.start_date.map(|d| transaction::Column::Date.gte(d)))
            .add_option(self.end_date.map(|d| transaction::Column::Date.lte(d)))
    }
}

/// Validates precision on the way in and fixes the scale at two places.
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    let normalized = amount.normalize();
    if normalized.scale() > AMOUNT_DECIMAL_PLACES {
        return Err(StoreError::validation(
            "amount",
            format!(
                "Ensure that there are no more than {} decimal places.",
                AMOUNT_DECIMAL_PLACES
            ),
        ));
    }
    let integer_limit = Decimal::from(10_i64.pow(AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES));
    if normalized.abs().trunc() >= integer_limit {
        return Err(StoreError::validation(
            "amount",
            format!(
                "Ensure that there are no more than {} digits in total.",
                AMOUNT_MAX_DIGITS
            ),
        ));
    }
    Ok(money(normalized))
}

/// Rounds to cents and pins the scale so `4.5` reads back as `4.50`.
pub fn money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(AMOUNT_DECIMAL_PLACES);
    rounded.rescale(AMOUNT_DECIMAL_PLACES);
    rounded
}

/// Returns `year`/`month` of a date, the key used for monthly grouping.
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

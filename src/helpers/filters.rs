use compute::BudgetMonth;
use model::store::Filters;

use crate::helpers::errors::{ApiError, compute_error, store_error};
use crate::schemas::{DateRangeQuery, MonthQuery};

/// Turns the query string into the explicit filter passed to the stores.
pub fn date_filters(query: &DateRangeQuery) -> Result<Filters, ApiError> {
    Filters::new(query.start_date, query.end_date).map_err(store_error)
}

/// Resolves `?year&month`, falling back to the current month for missing parts.
pub fn budget_month(query: &MonthQuery) -> Result<BudgetMonth, ApiError> {
    let current = BudgetMonth::current();
    match (query.year, query.month) {
        (None, None) => Ok(current),
        (year, month) => BudgetMonth::new(
            year.unwrap_or(current.year()),
            month.unwrap_or(current.month()),
        )
        .map_err(compute_error),
    }
}

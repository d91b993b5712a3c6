//! Read-side aggregation over a user's transactions and budgets.
//!
//! Nothing in this crate writes to the database. Every computation fetches
//! rows through `model::store` with the caller's id and an explicit
//! [`Filters`](model::store::Filters), then groups them in memory.

pub mod analytics;
pub mod budget_progress;
pub mod error;
pub mod export;
pub mod totals;

#[cfg(test)]
pub(crate) mod testing;

pub use analytics::AnalyticsComputer;
pub use budget_progress::{BudgetMonth, BudgetProgressComputer};
pub use error::{ComputeError, Result};
pub use export::{EXPORT_FILENAME, export_expenses};
pub use totals::TotalsComputer;

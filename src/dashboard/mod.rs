//! Dashboard module
//!
//! Computes the figures shown on the dashboard and the monthly spending page
//! from a user's transactions.

mod aggregation;
mod summary;

pub use aggregation::{
    DEFAULT_STARTING_BALANCE, MonthlySpend, TRAILING_SERIES_MONTHS, current_month_savings,
    current_month_spend, month_label, running_balance, spend_by_category, spend_by_day,
    trailing_series,
};
pub use summary::{
    CategorySpend, DailySpend, DashboardSummary, MonthlySpending, RECENT_TRANSACTION_COUNT,
    recent_transactions, search_transactions,
};

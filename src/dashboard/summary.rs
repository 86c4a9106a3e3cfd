//! The figures shown on the dashboard and the monthly spending page, plus
//! the search and "recent transactions" helpers the views use.

use serde::Serialize;
use time::Date;

use crate::{
    dashboard::aggregation::{
        MonthlySpend, TRAILING_SERIES_MONTHS, current_month_savings, current_month_spend,
        month_label, running_balance, spend_by_category, spend_by_day, trailing_series,
    },
    transaction::Transaction,
};

/// How many transactions the dashboard lists under "Recent Transactions".
pub const RECENT_TRANSACTION_COUNT: usize = 3;

/// Everything shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The starting balance plus all income minus all expenses.
    pub total_balance: f64,
    /// The sum of this month's expenses.
    pub monthly_spending: f64,
    /// This month's income minus this month's expenses.
    pub monthly_savings: f64,
    /// Expense totals for the last six months, oldest first.
    pub spending_overview: Vec<MonthlySpend>,
    /// The most recent transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
}

impl DashboardSummary {
    /// Compute the dashboard figures.
    ///
    /// `transactions` should be ordered most recent first, as returned by
    /// [crate::list_transactions].
    pub fn build(
        transactions: &[Transaction],
        starting_balance: f64,
        reference_date: Date,
    ) -> Self {
        Self {
            total_balance: running_balance(transactions, starting_balance),
            monthly_spending: current_month_spend(transactions, reference_date),
            monthly_savings: current_month_savings(transactions, reference_date),
            spending_overview: trailing_series(
                transactions,
                reference_date,
                TRAILING_SERIES_MONTHS,
            ),
            recent_transactions: recent_transactions(transactions, RECENT_TRANSACTION_COUNT),
        }
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    /// The transaction category, e.g. "food".
    pub category: String,
    /// The sum of the category's expenses.
    pub amount: f64,
}

/// The total spent on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpend {
    /// The day of the month, starting at 1.
    pub day: u8,
    /// The sum of the day's expenses.
    pub amount: f64,
}

/// The breakdown of one month's expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpending {
    /// Three-letter month name, e.g. "Mar".
    pub month: &'static str,
    /// The calendar year of the month.
    pub year: i32,
    /// The sum of the month's expenses.
    pub total: f64,
    /// Expense totals per category, largest first.
    pub by_category: Vec<CategorySpend>,
    /// Expense totals per day, in day order.
    pub by_day: Vec<DailySpend>,
}

impl MonthlySpending {
    /// Compute the breakdown for the month of `reference_date`.
    pub fn build(transactions: &[Transaction], reference_date: Date) -> Self {
        let mut by_category: Vec<CategorySpend> = spend_by_category(transactions, reference_date)
            .into_iter()
            .map(|(category, amount)| CategorySpend { category, amount })
            .collect();
        // Stable sort, so equal amounts stay in alphabetical order.
        by_category.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let by_day = spend_by_day(transactions, reference_date)
            .into_iter()
            .map(|(day, amount)| DailySpend { day, amount })
            .collect();

        Self {
            month: month_label(reference_date.month()),
            year: reference_date.year(),
            total: current_month_spend(transactions, reference_date),
            by_category,
            by_day,
        }
    }
}

/// The first `count` transactions, i.e. the most recent ones when
/// `transactions` is ordered most recent first.
pub fn recent_transactions(transactions: &[Transaction], count: usize) -> Vec<Transaction> {
    transactions.iter().take(count).cloned().collect()
}

/// The transactions whose description or category contains `query`,
/// ignoring case.
///
/// An empty query matches every transaction. The order of `transactions` is
/// kept.
pub fn search_transactions(transactions: &[Transaction], query: &str) -> Vec<Transaction> {
    let query = query.to_lowercase();

    transactions
        .iter()
        .filter(|transaction| {
            transaction.description.to_lowercase().contains(&query)
                || transaction.category.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

//! Transaction aggregation for the dashboard and the monthly spending page.
//!
//! All functions are pure: they work on transactions that have already been
//! loaded from the database and never fail. "Current month" always means the
//! month and year of the reference date passed in by the caller.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Month};

use crate::transaction::Transaction;

/// The balance a new user starts with before any transactions.
///
/// This is a placeholder rather than a value read from the database.
pub const DEFAULT_STARTING_BALANCE: f64 = 24650.80;

/// How many months the dashboard spending chart covers.
pub const TRAILING_SERIES_MONTHS: u8 = 6;

/// The total spent in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpend {
    /// Three-letter month name, e.g. "Jan".
    pub label: &'static str,
    /// The calendar year of the month.
    pub year: i32,
    /// The month number, 1 for January.
    pub month: u8,
    /// The sum of the month's expenses. Zero if nothing was spent.
    pub amount: f64,
}

/// The starting balance plus all income minus all expenses.
///
/// Every transaction counts, regardless of date.
pub fn running_balance(transactions: &[Transaction], starting_balance: f64) -> f64 {
    transactions
        .iter()
        .fold(starting_balance, |balance, transaction| {
            balance + transaction.signed_amount()
        })
}

/// The sum of the expenses in the same month and year as `reference_date`.
pub fn current_month_spend(transactions: &[Transaction], reference_date: Date) -> f64 {
    expenses_in_month(transactions, reference_date.year(), reference_date.month())
        .map(|transaction| transaction.amount)
        .sum()
}

/// The income minus the expenses in the same month and year as `reference_date`.
///
/// Negative when more was spent than earned.
pub fn current_month_savings(transactions: &[Transaction], reference_date: Date) -> f64 {
    let income: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.is_income()
                && is_in_month(
                    transaction.date,
                    reference_date.year(),
                    reference_date.month(),
                )
        })
        .map(|transaction| transaction.amount)
        .sum();

    income - current_month_spend(transactions, reference_date)
}

/// The expense totals for the `months` calendar months up to and including
/// the month of `reference_date`, oldest first.
///
/// Months without expenses have an amount of zero.
pub fn trailing_series(
    transactions: &[Transaction],
    reference_date: Date,
    months: u8,
) -> Vec<MonthlySpend> {
    let mut series: Vec<MonthlySpend> = Vec::with_capacity(months as usize);
    let mut year = reference_date.year();
    let mut month = reference_date.month();

    for _ in 0..months {
        let amount = expenses_in_month(transactions, year, month)
            .map(|transaction| transaction.amount)
            .sum();

        series.push(MonthlySpend {
            label: month_label(month),
            year,
            month: month as u8,
            amount,
        });

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    series.reverse();
    series
}

/// The expense totals for each category in the month of `reference_date`.
///
/// Categories without expenses in that month are left out.
pub fn spend_by_category(
    transactions: &[Transaction],
    reference_date: Date,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    let expenses = expenses_in_month(transactions, reference_date.year(), reference_date.month());

    for transaction in expenses {
        *totals.entry(transaction.category.clone()).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// The expense totals for each day of the month of `reference_date`.
///
/// Keys are the day of the month, starting at 1. Days without expenses are
/// left out.
pub fn spend_by_day(transactions: &[Transaction], reference_date: Date) -> BTreeMap<u8, f64> {
    let mut totals = BTreeMap::new();

    let expenses = expenses_in_month(transactions, reference_date.year(), reference_date.month());

    for transaction in expenses {
        *totals.entry(transaction.date.day()).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// Formats a month as a three-letter abbreviation, e.g. "Jan".
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn is_in_month(date: Date, year: i32, month: Month) -> bool {
    date.year() == year && date.month() == month
}

fn expenses_in_month(
    transactions: &[Transaction],
    year: i32,
    month: Month,
) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |transaction| {
        transaction.is_expense() && is_in_month(transaction.date, year, month)
    })
}

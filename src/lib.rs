//! Fintrack is a personal finance tracker.
//!
//! Users sign up, record income and expense transactions, and view a
//! dashboard and a monthly spending breakdown computed from those
//! transactions.
//!
//! This library provides the SQLite-backed data layer (users and
//! transactions), password hashing, and the aggregations behind the
//! dashboard. [AppState] ties these together for front ends.

#![warn(missing_docs)]

use rusqlite::ErrorCode;

mod app_state;
mod config;
mod dashboard;
mod database_id;
mod db;
mod email;
mod format;
mod logging;
mod password;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use config::{AppConfig, DEFAULT_TIMEZONE};
pub use dashboard::{
    CategorySpend, DEFAULT_STARTING_BALANCE, DailySpend, DashboardSummary, MonthlySpend,
    MonthlySpending, RECENT_TRANSACTION_COUNT, TRAILING_SERIES_MONTHS, current_month_savings,
    current_month_spend, month_label, recent_transactions, running_balance, search_transactions,
    spend_by_category, spend_by_day, trailing_series,
};
pub use database_id::{DatabaseId, TransactionId};
pub use db::{initialize as initialize_db, open as open_db};
pub use email::Email;
pub use format::format_currency;
pub use logging::init_logging;
pub use password::{PASSWORD_MIN_LENGTH, PasswordHash, ValidatedPassword};
pub use timezone::{get_local_offset, today};
pub use transaction::{
    Category, NewTransaction, ParseTransactionTypeError, Transaction, TransactionType,
    add_transaction, count_transactions, list_transactions, parse_amount,
};
pub use user::{User, UserID, authenticate, count_users, create_user, get_user_by_id};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email address is already registered to another user.
    ///
    /// No new user is created. The client should try again with a different
    /// email address or log in instead.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The user ID does not refer to a registered user.
    #[error("the user ID does not refer to a registered user")]
    UnknownUser,

    /// The amount of a transaction was negative, not a finite number, or
    /// could not be parsed as a number.
    ///
    /// Callers should pass in the offending input as a string.
    #[error("\"{0}\" is not a valid amount, amounts must be non-negative numbers")]
    InvalidAmount(String),

    /// The database could not be opened, is read-only, locked, or is not a
    /// SQLite database.
    ///
    /// This error is fatal when it occurs while initializing the database.
    #[error("the database is unavailable: {0}")]
    StorageUnavailable(String),

    /// A row in the database could not be converted into its domain type.
    ///
    /// This indicates that the database was modified outside of this
    /// application or that the schema has drifted.
    #[error("found a corrupt record in the database: {0}")]
    CorruptRecord(String),

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The password has fewer than [PASSWORD_MIN_LENGTH] characters.
    #[error("password must be at least {PASSWORD_MIN_LENGTH} characters")]
    PasswordTooShort,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging. When
    /// communicating with the user this error should be replaced with a
    /// general error message.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A background task running a database query panicked or was cancelled.
    #[error("a background database task failed: {0}")]
    BackgroundTaskFailed(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("users.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::UnknownUser
            }
            rusqlite::Error::SqliteFailure(sql_error, ref desc)
                if matches!(
                    sql_error.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::ReadOnly
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::SystemIoFailure
                        | ErrorCode::NotADatabase
                        | ErrorCode::PermissionDenied
                        | ErrorCode::DiskFull
                ) =>
            {
                let reason = desc.clone().unwrap_or_else(|| sql_error.to_string());
                tracing::error!("the database is unavailable: {reason}");
                Error::StorageUnavailable(reason)
            }
            rusqlite::Error::FromSqlConversionFailure(column, _, ref error) => {
                Error::CorruptRecord(format!("column {column}: {error}"))
            }
            rusqlite::Error::InvalidColumnType(column, ref name, column_type) => {
                Error::CorruptRecord(format!(
                    "column {column} ({name}) has unexpected type {column_type}"
                ))
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

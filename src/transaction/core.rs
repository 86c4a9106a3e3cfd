//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId, transaction::TransactionType, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money spent or earned in this transaction. Never negative.
    pub amount: f64,
    /// What the money was earned or spent on, e.g. "food".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(kind: TransactionType, amount: f64, date: Date) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            date,
            category: "other".to_owned(),
            description: String::new(),
        }
    }

    /// Whether money was earned in this transaction.
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Whether money was spent in this transaction.
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// The amount with expenses negated, i.e. the change to the user's balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A builder for transactions that have not been stored yet.
///
/// The category defaults to "other", which is a suggested category for both
/// income and expenses, and the description defaults to an empty string.
///
/// # Examples
///
/// ```
/// use time::macros::date;
///
/// use fintrack::{Transaction, TransactionType};
///
/// let lunch = Transaction::build(TransactionType::Expense, 42.5, date!(2024 - 03 - 01))
///     .category("food")
///     .description("lunch");
///
/// assert_eq!(lunch.category, "food");
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// The amount of money. Must not be negative, the direction of the
    /// transaction is given by `kind`.
    pub amount: f64,

    /// What the money was earned or spent on.
    ///
    /// Any string is accepted, see [TransactionType::suggested_categories]
    /// for the ones offered to users.
    pub category: String,

    /// A human-readable description of the transaction, e.g. "lunch".
    pub description: String,

    /// The date when the transaction occurred.
    pub date: Date,
}

impl NewTransaction {
    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// Parse user input as a transaction amount.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `text` is not a number, or the number is
/// negative, infinite or NaN.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    let amount: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount(text.to_owned()))?;

    validate_amount(amount)
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount.to_string()))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for the user `user_id` in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative, infinite or NaN,
/// - or [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(new_transaction.amount)?;

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (user_id, type, amount, category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, type, amount, category, description, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.kind,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.description,
                new_transaction.date,
            ),
            map_transaction_row,
        )?;

    tracing::debug!(
        "user {user_id} added {} transaction {}",
        transaction.kind,
        transaction.id
    );

    Ok(transaction)
}

/// Retrieve all of a user's transactions, most recent first.
///
/// Transactions on the same date are returned in the order they were added.
/// A user with no transactions, or an unknown user, gets an empty vector.
///
/// # Errors
/// This function will return a:
/// - [Error::CorruptRecord] if a stored row cannot be read as a transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn list_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, category, description, date
             FROM transactions
             WHERE user_id = :user_id
             ORDER BY date DESC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the number of transactions the user `user_id` has recorded.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM transactions WHERE user_id = ?1;",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id)
                )",
        (),
    )?;

    // Used for listing a user's transactions by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns id, user_id, type, amount, category,
/// description and date, in that order.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let kind = row.get(2)?;
    let amount: f64 = row.get(3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;
    let date = row.get(6)?;

    if !(amount.is_finite() && amount >= 0.0) {
        return Err(rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Real,
            format!("{amount} is not a valid amount").into(),
        ));
    }

    Ok(Transaction {
        id,
        user_id,
        kind,
        amount,
        category,
        description,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        db::initialize,
        email::Email,
        transaction::{
            Transaction, TransactionType, add_transaction, count_transactions, list_transactions,
        },
        user::{UserID, create_user},
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user_id = create_user(
            &Email::new_unchecked("a@x.com"),
            &PasswordHash::new_unchecked("not a real hash"),
            None,
            &conn,
        )
        .unwrap();

        (conn, user_id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection();

        let result = add_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, 42.5, date!(2024 - 03 - 01))
                .category("food")
                .description("lunch"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert!(transaction.id > 0);
                assert_eq!(transaction.user_id, user_id);
                assert_eq!(transaction.kind, TransactionType::Expense);
                assert_eq!(transaction.amount, 42.5);
                assert_eq!(transaction.category, "food");
                assert_eq!(transaction.description, "lunch");
                assert_eq!(transaction.date, date!(2024 - 03 - 01));
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_accepts_zero_amount() {
        let (conn, user_id) = get_test_connection();

        let result = add_transaction(
            user_id,
            Transaction::build(TransactionType::Income, 0.0, date!(2024 - 03 - 01)),
            &conn,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let (conn, user_id) = get_test_connection();

        let result = add_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, -5.0, date!(2024 - 03 - 01)),
            &conn,
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(count_transactions(user_id, &conn).unwrap(), 0);
    }

    #[test]
    fn create_fails_on_nan_amount() {
        let (conn, user_id) = get_test_connection();

        let result = add_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, f64::NAN, date!(2024 - 03 - 01)),
            &conn,
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn create_fails_on_unknown_user() {
        let (conn, user_id) = get_test_connection();

        let result = add_transaction(
            UserID::new(user_id.as_i64() + 1),
            Transaction::build(TransactionType::Expense, 1.0, date!(2024 - 03 - 01)),
            &conn,
        );

        assert_eq!(result, Err(Error::UnknownUser));
    }

    #[test]
    fn list_is_empty_for_user_without_transactions() {
        let (conn, user_id) = get_test_connection();

        let transactions = list_transactions(user_id, &conn).unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn list_orders_by_date_descending() {
        let (conn, user_id) = get_test_connection();
        for date in [
            date!(2024 - 03 - 01),
            date!(2024 - 05 - 01),
            date!(2024 - 04 - 01),
        ] {
            add_transaction(
                user_id,
                Transaction::build(TransactionType::Expense, 1.0, date),
                &conn,
            )
            .unwrap();
        }

        let earlier = add_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, 1.0, date!(2024 - 01 - 01)),
            &conn,
        )
        .unwrap();

        let transactions = list_transactions(user_id, &conn).unwrap();
        let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();

        assert_eq!(
            dates,
            [
                date!(2024 - 05 - 01),
                date!(2024 - 04 - 01),
                date!(2024 - 03 - 01),
                date!(2024 - 01 - 01),
            ]
        );
        assert_eq!(transactions.last(), Some(&earlier));
    }

    #[test]
    fn list_keeps_insertion_order_for_same_date() {
        let (conn, user_id) = get_test_connection();
        let mut want_ids = Vec::new();
        for description in ["first", "second", "third"] {
            let transaction = add_transaction(
                user_id,
                Transaction::build(TransactionType::Expense, 1.0, date!(2024 - 03 - 01))
                    .description(description),
                &conn,
            )
            .unwrap();
            want_ids.push(transaction.id);
        }

        let got_ids: Vec<_> = list_transactions(user_id, &conn)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(got_ids, want_ids);
    }

    #[test]
    fn list_only_returns_own_transactions() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            &Email::new_unchecked("b@x.com"),
            &PasswordHash::new_unchecked("not a real hash"),
            None,
            &conn,
        )
        .unwrap();
        add_transaction(
            other_user,
            Transaction::build(TransactionType::Income, 10.0, date!(2024 - 03 - 01)),
            &conn,
        )
        .unwrap();
        let own = add_transaction(
            user_id,
            Transaction::build(TransactionType::Income, 20.0, date!(2024 - 03 - 01)),
            &conn,
        )
        .unwrap();

        let transactions = list_transactions(user_id, &conn).unwrap();

        assert_eq!(transactions, [own]);
    }

    #[test]
    fn list_fails_on_unknown_type() {
        let (conn, user_id) = get_test_connection();
        conn.execute(
            "INSERT INTO transactions (user_id, type, amount, category, description, date)
             VALUES (?1, 'refund', 1.0, 'other', '', '2024-03-01')",
            (user_id.as_i64(),),
        )
        .unwrap();

        let result = list_transactions(user_id, &conn);

        assert!(
            matches!(result, Err(Error::CorruptRecord(_))),
            "want corrupt record error, got {result:?}"
        );
    }

    #[test]
    fn list_fails_on_negative_stored_amount() {
        let (conn, user_id) = get_test_connection();
        conn.execute(
            "INSERT INTO transactions (user_id, type, amount, category, description, date)
             VALUES (?1, 'expense', -1.0, 'other', '', '2024-03-01')",
            (user_id.as_i64(),),
        )
        .unwrap();

        let result = list_transactions(user_id, &conn);

        assert!(
            matches!(result, Err(Error::CorruptRecord(_))),
            "want corrupt record error, got {result:?}"
        );
    }

    #[test]
    fn list_fails_on_unparseable_date() {
        let (conn, user_id) = get_test_connection();
        conn.execute(
            "INSERT INTO transactions (user_id, type, amount, category, description, date)
             VALUES (?1, 'expense', 1.0, 'other', '', 'last tuesday')",
            (user_id.as_i64(),),
        )
        .unwrap();

        let result = list_transactions(user_id, &conn);

        assert!(
            matches!(result, Err(Error::CorruptRecord(_))),
            "want corrupt record error, got {result:?}"
        );
    }

    #[test]
    fn get_count() {
        let (conn, user_id) = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            add_transaction(
                user_id,
                Transaction::build(TransactionType::Expense, i as f64, today),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(user_id, &conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}

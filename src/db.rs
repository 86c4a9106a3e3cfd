//! Creates the application's tables in a SQLite database.

use std::path::Path;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// Create the tables for the domain models if they do not exist.
///
/// This enables foreign key enforcement on `connection`, so it must be called
/// on every new connection before any other query is run. Calling it more than
/// once is harmless.
///
/// # Errors
///
/// Returns [Error::StorageUnavailable] if the database cannot be opened or
/// written to, or [Error::SqlError] for any other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must run first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("database schema is ready");

    Ok(())
}

/// Open the SQLite database at `path`, creating the file if it does not exist.
///
/// # Errors
///
/// Returns [Error::StorageUnavailable] if the file cannot be opened or
/// created.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::from)
}

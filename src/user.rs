//! Code for creating the user table, registering users and checking their
//! credentials.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash, email::Email};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
///
/// The password hash stays in the database and is never part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the user logs in with.
    pub email: Email,
    /// The name the user gave when signing up, if any.
    pub name: Option<String>,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                name TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The caller is responsible for validating the email and password, see
/// [Email::new] and [crate::ValidatedPassword::new].
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` already belongs to a user,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    email: &Email,
    password_hash: &PasswordHash,
    name: Option<&str>,
    connection: &Connection,
) -> Result<UserID, Error> {
    connection.execute(
        "INSERT INTO users (email, password, name) VALUES (?1, ?2, ?3)",
        (email.as_ref(), password_hash.as_ref(), name),
    )?;

    let id = UserID::new(connection.last_insert_rowid());
    tracing::info!("created user {id}");

    Ok(id)
}

/// Check a user's email and password.
///
/// Returns the user if `email` belongs to a registered user and
/// `raw_password` matches their password, otherwise `None`. An unknown email
/// and a wrong password give the same result.
///
/// # Errors
///
/// Returns an error only if the database query failed.
pub fn authenticate(
    email: &str,
    raw_password: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    let row = connection
        .prepare("SELECT id, email, name, password FROM users WHERE email = :email")?
        .query_row(&[(":email", &email)], |row| {
            let user = map_user_row(row)?;
            let raw_password_hash: String = row.get(3)?;

            Ok((user, PasswordHash::new_unchecked(&raw_password_hash)))
        })
        .optional()?;

    let Some((user, password_hash)) = row else {
        tracing::debug!("log-in failed: no user is registered with the given email");
        return Ok(None);
    };

    if password_hash.verify(raw_password) {
        Ok(Some(user))
    } else {
        tracing::debug!("log-in failed: wrong password for user {}", user.id);
        Ok(None)
    }
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, name FROM users WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM users;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map the first three columns of a row (id, email, name) to a [User].
fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_email: String = row.get(1)?;
    let name = row.get(2)?;

    Ok(User {
        id: UserID::new(raw_id),
        email: Email::new_unchecked(&raw_email),
        name,
    })
}

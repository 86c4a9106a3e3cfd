//! Implements a struct that holds the state shared by the front ends.
//!
//! Every operation runs its database work on tokio's blocking thread pool, so
//! callers only wait at the `.await` and never see a partially applied write.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppConfig, DashboardSummary, Error, MonthlySpending, PasswordHash, ValidatedPassword,
    db::initialize,
    email::Email,
    search_transactions,
    timezone::today,
    transaction::{NewTransaction, Transaction, add_transaction, list_transactions},
    user::{User, UserID, authenticate, create_user},
};

/// The state of the application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The balance before any transactions.
    pub starting_balance: f64,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// users and transactions.
    ///
    /// # Errors
    /// Returns an error if `config` is invalid or the database cannot be
    /// initialized.
    pub fn new(db_connection: Connection, config: AppConfig) -> Result<Self, Error> {
        config.validate()?;
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: config.local_timezone,
            starting_balance: config.starting_balance,
            password_cost: config.password_cost,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Register a new user and log them in.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is invalid, the password is too short,
    /// the email is already registered or the database query failed.
    pub async fn sign_up(
        &self,
        email: &str,
        raw_password: &str,
        name: Option<&str>,
    ) -> Result<User, Error> {
        let email = Email::new(email)?;
        let password = ValidatedPassword::new(raw_password)?;
        let raw_password = raw_password.to_owned();
        let name = name.map(str::to_owned);
        let password_hash = self.hash_password(password).await?;

        let user = self
            .with_connection(move |connection| {
                create_user(&email, &password_hash, name.as_deref(), connection)?;

                authenticate(email.as_ref(), &raw_password, connection)?
                    .ok_or(Error::InvalidCredentials)
            })
            .await
            .inspect_err(|error| tracing::info!("sign-up failed: {error}"))?;

        tracing::info!("user {} signed up", user.id);

        Ok(user)
    }

    /// Log in with an email and password.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the email is not registered or
    /// the password is wrong. The two cases are not distinguished.
    pub async fn log_in(&self, email: &str, raw_password: &str) -> Result<User, Error> {
        let email = email.to_owned();
        let raw_password = raw_password.to_owned();

        let user = self
            .with_connection(move |connection| authenticate(&email, &raw_password, connection))
            .await?;

        match user {
            Some(user) => {
                tracing::info!("user {} logged in", user.id);
                Ok(user)
            }
            None => Err(Error::InvalidCredentials),
        }
    }

    /// Record a transaction for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if the amount is negative or not finite,
    /// or [Error::UnknownUser] if `user_id` is not a registered user.
    pub async fn add_transaction(
        &self,
        user_id: UserID,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        let transaction = self
            .with_connection(move |connection| {
                add_transaction(user_id, new_transaction, connection)
            })
            .await
            .inspect_err(|error| tracing::warn!("could not add transaction: {error}"))?;

        tracing::info!(
            "user {} added transaction {}",
            transaction.user_id,
            transaction.id
        );

        Ok(transaction)
    }

    /// All of the transactions for `user_id`, most recent first.
    pub async fn transactions(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.with_connection(move |connection| list_transactions(user_id, connection))
            .await
    }

    /// The transactions for `user_id` whose description or category contains
    /// `query`, ignoring case. Most recent first.
    pub async fn search(&self, user_id: UserID, query: &str) -> Result<Vec<Transaction>, Error> {
        let transactions = self.transactions(user_id).await?;

        Ok(search_transactions(&transactions, query))
    }

    /// The dashboard figures for `user_id`, using today's date in the local
    /// timezone as the current month.
    pub async fn dashboard(&self, user_id: UserID) -> Result<DashboardSummary, Error> {
        let reference_date = today(&self.local_timezone)?;
        let transactions = self.transactions(user_id).await?;

        Ok(DashboardSummary::build(
            &transactions,
            self.starting_balance,
            reference_date,
        ))
    }

    /// The spending breakdown of the current month for `user_id`.
    pub async fn monthly_spending(&self, user_id: UserID) -> Result<MonthlySpending, Error> {
        let reference_date = today(&self.local_timezone)?;
        let transactions = self.transactions(user_id).await?;

        Ok(MonthlySpending::build(&transactions, reference_date))
    }

    /// Hash `password` on the blocking thread pool without holding the
    /// database lock.
    async fn hash_password(&self, password: ValidatedPassword) -> Result<PasswordHash, Error> {
        let cost = self.password_cost;

        tokio::task::spawn_blocking(move || PasswordHash::new(password, cost))
            .await
            .map_err(|error| {
                tracing::error!("password hashing task failed: {error}");
                Error::BackgroundTaskFailed(error.to_string())
            })?
    }

    async fn with_connection<F, T>(&self, query: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let db_connection = self.db_connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            query(&connection)
        })
        .await
        .map_err(|error| {
            tracing::error!("database task failed: {error}");
            Error::BackgroundTaskFailed(error.to_string())
        })?
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        AppConfig, AppState, Error, PasswordHash, ValidatedPassword,
        timezone::today,
        transaction::{Transaction, TransactionType},
        user::UserID,
    };

    fn get_test_state() -> AppState {
        let connection = Connection::open_in_memory().expect("Could not open database in memory");
        let config = AppConfig {
            starting_balance: 100.0,
            password_cost: PasswordHash::MIN_COST,
            ..Default::default()
        };

        AppState::new(connection, config).expect("Could not create app state")
    }

    #[test]
    fn new_rejects_invalid_config() {
        let connection = Connection::open_in_memory().expect("Could not open database in memory");
        let config = AppConfig {
            local_timezone: "Not/AZone".to_owned(),
            ..Default::default()
        };

        let result = AppState::new(connection, config);

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }

    #[tokio::test]
    async fn sign_up_returns_logged_in_user() {
        let state = get_test_state();

        let user = state
            .sign_up("foo@bar.baz", "hunter2hunter2", Some("Foo"))
            .await
            .expect("Could not sign up");

        assert_eq!(user.id, UserID::new(1));
        assert_eq!(user.email.as_ref(), "foo@bar.baz");
        assert_eq!(user.name.as_deref(), Some("Foo"));
    }

    #[tokio::test]
    #[allow(clippy::await_holding_lock)]
    async fn hashing_does_not_need_database_lock() {
        let state = get_test_state();
        let _guard = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        let password_hash = state
            .hash_password(ValidatedPassword::new_unchecked("hunter2hunter2"))
            .await
            .expect("Could not hash password");

        assert!(password_hash.verify("hunter2hunter2"));
    }

    #[tokio::test]
    async fn sign_up_validates_input() {
        let state = get_test_state();

        assert_eq!(
            state.sign_up("not an email", "hunter2hunter2", None).await,
            Err(Error::InvalidEmail("not an email".to_owned()))
        );
        assert_eq!(
            state.sign_up("foo@bar.baz", "short", None).await,
            Err(Error::PasswordTooShort)
        );
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let state = get_test_state();
        state
            .sign_up("foo@bar.baz", "hunter2hunter2", None)
            .await
            .expect("Could not sign up");

        let result = state.sign_up("foo@bar.baz", "anotherpassword", None).await;

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_fails() {
        let state = get_test_state();
        state
            .sign_up("foo@bar.baz", "hunter2hunter2", None)
            .await
            .expect("Could not sign up");

        assert_eq!(
            state.log_in("foo@bar.baz", "wrongpassword").await,
            Err(Error::InvalidCredentials)
        );
        assert_eq!(
            state.log_in("nobody@bar.baz", "hunter2hunter2").await,
            Err(Error::InvalidCredentials)
        );
        assert!(state.log_in("foo@bar.baz", "hunter2hunter2").await.is_ok());
    }

    #[tokio::test]
    async fn dashboard_uses_current_month() {
        let state = get_test_state();
        let user = state
            .sign_up("foo@bar.baz", "hunter2hunter2", None)
            .await
            .expect("Could not sign up");
        let today = today("Etc/UTC").expect("Could not get today's date");
        let last_year = today - Duration::days(366);
        state
            .add_transaction(
                user.id,
                Transaction::build(TransactionType::Expense, 40.0, today).category("food"),
            )
            .await
            .expect("Could not add transaction");
        state
            .add_transaction(
                user.id,
                Transaction::build(TransactionType::Income, 500.0, last_year),
            )
            .await
            .expect("Could not add transaction");

        let dashboard = state.dashboard(user.id).await.expect("Could not get dashboard");
        let monthly = state
            .monthly_spending(user.id)
            .await
            .expect("Could not get monthly spending");

        assert_eq!(dashboard.total_balance, 560.0);
        assert_eq!(dashboard.monthly_spending, 40.0);
        assert_eq!(dashboard.monthly_savings, -40.0);
        assert_eq!(dashboard.recent_transactions.len(), 2);
        assert_eq!(monthly.total, 40.0);
        assert_eq!(monthly.by_category.len(), 1);
        assert_eq!(monthly.by_category[0].category, "food");
    }

    #[tokio::test]
    async fn search_filters_transactions() {
        let state = get_test_state();
        let user = state
            .sign_up("foo@bar.baz", "hunter2hunter2", None)
            .await
            .expect("Could not sign up");
        let today = today("Etc/UTC").expect("Could not get today's date");
        for description in ["Groceries", "Bus fare", "grocery top-up"] {
            state
                .add_transaction(
                    user.id,
                    Transaction::build(TransactionType::Expense, 1.0, today)
                        .description(description),
                )
                .await
                .expect("Could not add transaction");
        }

        let result = state.search(user.id, "GROCER").await.expect("Could not search");

        let descriptions: Vec<_> = result.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["Groceries", "grocery top-up"]);
    }

    #[tokio::test]
    async fn add_transaction_for_unknown_user_fails() {
        let state = get_test_state();
        let today = today("Etc/UTC").expect("Could not get today's date");

        let result = state
            .add_transaction(
                UserID::new(42),
                Transaction::build(TransactionType::Expense, 1.0, today),
            )
            .await;

        assert_eq!(result, Err(Error::UnknownUser));
    }
}

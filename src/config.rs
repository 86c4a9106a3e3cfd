//! Settings shared by the front ends.

use crate::{DEFAULT_STARTING_BALANCE, Error, PasswordHash, timezone::get_local_offset};

/// The timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Settings for [crate::AppState].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Decides which month is the current month.
    pub local_timezone: String,

    /// The balance before any transactions.
    pub starting_balance: f64,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            local_timezone: DEFAULT_TIMEZONE.to_owned(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Check the settings before they are used.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the timezone is not a canonical timezone name,
    /// - the starting balance is not a finite number,
    /// - the password cost is outside the range bcrypt accepts.
    pub fn validate(&self) -> Result<(), Error> {
        if get_local_offset(&self.local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(self.local_timezone.clone()));
        }

        if !self.starting_balance.is_finite() {
            return Err(Error::InvalidAmount(self.starting_balance.to_string()));
        }

        if !(PasswordHash::MIN_COST..=31).contains(&self.password_cost) {
            return Err(Error::HashingError(format!(
                "cost must be between {} and 31, got {}",
                PasswordHash::MIN_COST,
                self.password_cost
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{AppConfig, DEFAULT_STARTING_BALANCE, Error, PasswordHash};

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();

        assert_eq!(config.local_timezone, "Etc/UTC");
        assert_eq!(config.starting_balance, DEFAULT_STARTING_BALANCE);
        assert_eq!(config.password_cost, PasswordHash::DEFAULT_COST);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let config = AppConfig {
            local_timezone: "Not/AZone".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(Error::InvalidTimezoneError("Not/AZone".to_owned()))
        );
    }

    #[test]
    fn rejects_non_finite_starting_balance() {
        let config = AppConfig {
            starting_balance: f64::INFINITY,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn rejects_cost_below_minimum() {
        let config = AppConfig {
            password_cost: 3,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(Error::HashingError(_))));
    }
}

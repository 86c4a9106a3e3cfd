//! Whether a transaction is income or an expense, and the categories
//! suggested for each.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// The direction money moved in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

/// A category offered to the user when recording a transaction.
///
/// Categories are free-form text in the database, these are only suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The value stored in the database, e.g. "food".
    pub value: &'static str,
    /// The human readable name, e.g. "Food & Dining".
    pub label: &'static str,
}

const INCOME_CATEGORIES: [Category; 4] = [
    Category {
        value: "salary",
        label: "Salary",
    },
    Category {
        value: "freelance",
        label: "Freelance",
    },
    Category {
        value: "investments",
        label: "Investments",
    },
    Category {
        value: "other",
        label: "Other",
    },
];

const EXPENSE_CATEGORIES: [Category; 6] = [
    Category {
        value: "food",
        label: "Food & Dining",
    },
    Category {
        value: "transportation",
        label: "Transportation",
    },
    Category {
        value: "utilities",
        label: "Utilities",
    },
    Category {
        value: "entertainment",
        label: "Entertainment",
    },
    Category {
        value: "shopping",
        label: "Shopping",
    },
    Category {
        value: "other",
        label: "Other",
    },
];

impl TransactionType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The categories to offer when recording a transaction of this type.
    pub fn suggested_categories(&self) -> &'static [Category] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string was neither "income" nor "expense".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a transaction type, expected \"income\" or \"expense\"")]
pub struct ParseTransactionTypeError(String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseTransactionTypeError(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use super::TransactionType;

    #[test]
    fn parses_stored_strings() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let result = "Expense".parse::<TransactionType>();

        assert!(result.is_err());
    }

    #[test]
    fn display_matches_stored_string() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(TransactionType::Expense.to_string(), "expense");
    }

    #[test]
    fn both_types_suggest_other() {
        for kind in [TransactionType::Income, TransactionType::Expense] {
            assert!(
                kind.suggested_categories()
                    .iter()
                    .any(|category| category.value == "other"),
                "want \"other\" in the {kind} categories"
            );
        }
    }

    #[test]
    fn expense_categories_have_labels() {
        let food = TransactionType::Expense
            .suggested_categories()
            .iter()
            .find(|category| category.value == "food")
            .expect("want food category");

        assert_eq!(food.label, "Food & Dining");
    }

    #[test]
    fn serializes_as_lowercase() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();

        assert_eq!(json, "\"expense\"");
    }
}

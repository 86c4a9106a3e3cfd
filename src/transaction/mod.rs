//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder for creating transactions
//! - `TransactionType` and the suggested categories for each type
//! - Database functions for storing and listing a user's transactions

mod core;
mod kind;

pub use core::{
    NewTransaction, Transaction, add_transaction, count_transactions, create_transaction_table,
    list_transactions, parse_amount,
};
pub use kind::{Category, ParseTransactionTypeError, TransactionType};

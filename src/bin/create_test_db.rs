use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration};

use fintrack::{
    DEFAULT_TIMEZONE, Email, PasswordHash, Transaction, TransactionType, ValidatedPassword,
    add_transaction, create_user, initialize_db, today,
};

/// A utility for creating a test database for fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The local timezone used to decide which month is the current month.
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let today = today(&args.timezone)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user demo@example.com with the password 'password'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("password"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user_id = create_user(
        &Email::new_unchecked("demo@example.com"),
        &password_hash,
        Some("Demo User"),
        &conn,
    )?;

    println!("Creating sample transactions...");

    let mut count = 0;
    for months_ago in 0..6 {
        let month_start = first_of_month(today, months_ago);

        for (offset, kind, amount, category, description) in sample_month() {
            let date = month_start + Duration::days(offset);
            if date > today {
                continue;
            }

            add_transaction(
                user_id,
                Transaction::build(kind, amount, date)
                    .category(category)
                    .description(description),
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}

/// The first day of the month `months_ago` months before the month of `date`.
fn first_of_month(date: Date, months_ago: u32) -> Date {
    let mut date = date.replace_day(1).unwrap_or(date);

    for _ in 0..months_ago {
        date = date.previous_day().unwrap_or(date).replace_day(1).unwrap_or(date);
    }

    date
}

/// Day offsets from the start of the month with the transactions for that day.
fn sample_month() -> [(i64, TransactionType, f64, &'static str, &'static str); 8] {
    [
        (0, TransactionType::Income, 4250.0, "salary", "Monthly salary"),
        (1, TransactionType::Expense, 1450.0, "utilities", "Rent"),
        (3, TransactionType::Expense, 86.45, "food", "Groceries"),
        (6, TransactionType::Expense, 42.5, "transportation", "Fuel"),
        (9, TransactionType::Expense, 18.99, "entertainment", "Streaming subscription"),
        (13, TransactionType::Income, 600.0, "freelance", "Website project"),
        (17, TransactionType::Expense, 129.95, "shopping", "New shoes"),
        (22, TransactionType::Expense, 64.2, "food", "Dinner out"),
    ]
}

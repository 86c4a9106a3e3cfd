use std::{error::Error, io, process::exit};

use clap::{Parser, Subcommand};
use serde::Serialize;
use time::{Date, macros::format_description};

use fintrack::{
    AppConfig, AppState, DEFAULT_STARTING_BALANCE, DEFAULT_TIMEZONE, DashboardSummary,
    MonthlySpending, PasswordHash, Transaction, TransactionType, User, ValidatedPassword,
    format_currency, init_logging, open_db, parse_amount, today,
};

/// Track your income and expenses from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "fintrack.db")]
    db_path: String,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// The balance before any transactions.
    #[arg(long, default_value_t = DEFAULT_STARTING_BALANCE)]
    starting_balance: f64,

    /// Print results as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// The log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database tables if they do not exist.
    Init,

    /// Register a new user. The password is read from the terminal.
    SignUp {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,
    },

    /// Record an income or expense.
    Add {
        #[arg(long)]
        email: String,

        /// Either "income" or "expense".
        #[arg(long = "type")]
        kind: TransactionType,

        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "other")]
        category: String,

        #[arg(long, default_value = "")]
        description: String,

        /// The date as YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions, most recent first.
    List {
        #[arg(long)]
        email: String,

        /// Only show transactions whose description or category contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show the balance, this month's spending and savings, and recent transactions.
    Dashboard {
        #[arg(long)]
        email: String,
    },

    /// Show this month's spending by category and by day.
    Monthly {
        #[arg(long)]
        email: String,
    },

    /// List the suggested categories for a transaction type.
    Categories {
        #[arg(long = "type")]
        kind: TransactionType,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(error) = run(args).await {
        print_error(error);
        exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Command::Categories { kind } = &args.command {
        let categories = kind.suggested_categories();

        if args.json {
            return print_json(&categories);
        }

        for category in categories {
            println!("{:<16}{}", category.value, category.label);
        }

        return Ok(());
    }

    let config = AppConfig {
        local_timezone: args.timezone.clone(),
        starting_balance: args.starting_balance,
        password_cost: PasswordHash::DEFAULT_COST,
    };
    let connection = open_db(&args.db_path)?;
    let state = AppState::new(connection, config)?;

    match args.command {
        Command::Init => {
            println!("Database ready at {:?}", args.db_path);
        }
        Command::SignUp { email, name } => {
            let Some(password) = prompt_new_password()? else {
                return Ok(());
            };
            let user = state.sign_up(&email, &password, name.as_deref()).await?;

            if args.json {
                print_json(&user)?;
            } else {
                println!("Signed up {} with user ID {}", user.email, user.id);
            }
        }
        Command::Add {
            email,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let amount = parse_amount(&amount)?;
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => today(&state.local_timezone)?,
            };
            let user = log_in(&state, &email).await?;

            let transaction = state
                .add_transaction(
                    user.id,
                    Transaction::build(kind, amount, date)
                        .category(&category)
                        .description(&description),
                )
                .await?;

            if args.json {
                print_json(&transaction)?;
            } else {
                println!("Added transaction {}", transaction.id);
            }
        }
        Command::List { email, search } => {
            let user = log_in(&state, &email).await?;

            let transactions = match search {
                Some(query) => state.search(user.id, &query).await?,
                None => state.transactions(user.id).await?,
            };

            if args.json {
                print_json(&transactions)?;
            } else if transactions.is_empty() {
                println!("No transactions found.");
            } else {
                for transaction in &transactions {
                    print_transaction(transaction);
                }
            }
        }
        Command::Dashboard { email } => {
            let user = log_in(&state, &email).await?;
            let dashboard = state.dashboard(user.id).await?;

            if args.json {
                print_json(&dashboard)?;
            } else {
                print_dashboard(&dashboard);
            }
        }
        Command::Monthly { email } => {
            let user = log_in(&state, &email).await?;
            let monthly_spending = state.monthly_spending(user.id).await?;

            if args.json {
                print_json(&monthly_spending)?;
            } else {
                print_monthly_spending(&monthly_spending);
            }
        }
        Command::Categories { .. } => {}
    }

    Ok(())
}

async fn log_in(state: &AppState, email: &str) -> Result<User, Box<dyn Error>> {
    let password = rpassword::prompt_password(format!("Password for {email}: "))?;

    Ok(state.log_in(email, &password).await?)
}

/// Ask for a new password twice. Returns `None` if stdin was closed.
fn prompt_new_password() -> Result<Option<String>, io::Error> {
    loop {
        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        if let Err(error) = ValidatedPassword::new(&first_password) {
            print_error(error);
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ")
        {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        return Ok(Some(first_password));
    }
}

fn parse_date(text: &str) -> Result<Date, Box<dyn Error>> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|error| format!("\"{text}\" is not a valid date (YYYY-MM-DD): {error}").into())
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn print_transaction(transaction: &Transaction) {
    println!(
        "{}  {:<8}{:>14}  {:<16}{}",
        transaction.date,
        transaction.kind.as_str(),
        format_currency(transaction.signed_amount()),
        transaction.category,
        transaction.description
    );
}

fn print_dashboard(dashboard: &DashboardSummary) {
    println!("Total balance:     {}", format_currency(dashboard.total_balance));
    println!("Monthly spending:  {}", format_currency(dashboard.monthly_spending));
    println!("Monthly savings:   {}", format_currency(dashboard.monthly_savings));

    println!();
    println!("Spending overview");
    for month in &dashboard.spending_overview {
        println!(
            "  {} {}  {:>14}",
            month.label,
            month.year,
            format_currency(month.amount)
        );
    }

    println!();
    println!("Recent transactions");
    if dashboard.recent_transactions.is_empty() {
        println!("  No transactions yet.");
    }
    for transaction in &dashboard.recent_transactions {
        print!("  ");
        print_transaction(transaction);
    }
}

fn print_monthly_spending(monthly_spending: &MonthlySpending) {
    println!(
        "{} {}: {} spent",
        monthly_spending.month,
        monthly_spending.year,
        format_currency(monthly_spending.total)
    );

    println!();
    println!("By category");
    for category in &monthly_spending.by_category {
        println!(
            "  {:<16}{:>14}",
            category.category,
            format_currency(category.amount)
        );
    }

    println!();
    println!("By day");
    for day in &monthly_spending.by_day {
        println!("  {:>2}  {:>14}", day.day, format_currency(day.amount));
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}

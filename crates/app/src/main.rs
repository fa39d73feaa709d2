use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{BudgetPatch, Engine, NewUser, SummaryEntry, TransactionDraft, TransactionPatch, UserPatch};
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use settings::Storage;
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "budgetline")]
#[command(about = "Personal budget tracking: users, transactions and spending reports")]
struct Cli {
    /// Optional settings file path (TOML).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Tx(Tx),
    Budget(Budget),
    /// Budget report as JSON.
    Report { user: Uuid },
    /// Spending summary of the current month.
    Monthly { user: Uuid },
    /// Spending listing of the last seven days.
    Weekly { user: Uuid },
    /// Total spent over the last seven days.
    Last7 { user: Uuid },
    /// Write the user's transactions to stdout as CSV.
    Export { user: Uuid },
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Add(UserAddArgs),
    Update(UserUpdateArgs),
    Delete { id: Uuid },
    Show { id: Uuid },
    List,
}

#[derive(Args, Debug)]
struct UserAddArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value_t = 0.0)]
    budget: f64,
}

#[derive(Args, Debug)]
struct UserUpdateArgs {
    id: Uuid,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    budget: Option<String>,
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add(TxAddArgs),
    Update(TxUpdateArgs),
    Delete { id: Uuid },
    List {
        #[arg(long)]
        user: Option<Uuid>,
    },
}

#[derive(Args, Debug)]
struct TxAddArgs {
    #[arg(long)]
    user: Uuid,
    #[arg(long)]
    description: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    category: String,
}

#[derive(Args, Debug)]
struct TxUpdateArgs {
    id: Uuid,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Set { user: Uuid, budget: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budgetline={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let engine = build_engine(&settings.storage).await?;
    run(&engine, cli.command).await
}

async fn build_engine(storage: &Storage) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    match storage {
        Storage::Memory => {
            tracing::info!("using in-memory storage");
            Ok(Engine::builder().build())
        }
        Storage::Sqlite(path) => {
            tracing::info!(path = %path, "using sqlite storage");
            let database = sea_orm::Database::connect(format!("sqlite:{path}?mode=rwc")).await?;
            Migrator::up(&database, None).await?;
            Ok(Engine::builder().database(database).build())
        }
    }
}

async fn run(engine: &Engine, command: Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    let today = chrono::Utc::now().date_naive();

    match command {
        Command::User(user) => match user.command {
            UserCommand::Add(args) => {
                let user = engine
                    .add_user(NewUser::new(args.username, args.email, args.budget))
                    .await?;
                print_json(&user)?;
            }
            UserCommand::Update(args) => {
                let patch = UserPatch {
                    username: args.username.map(Some),
                    email: args.email.map(Some),
                    budget: args.budget.as_deref().map(loose_number),
                };
                print_json(&engine.update_user(args.id, &patch).await?)?;
            }
            UserCommand::Delete { id } => report_delete(engine.delete_user(id).await?, "user"),
            UserCommand::Show { id } => print_json(&engine.user(id).await?)?,
            UserCommand::List => print_json(&engine.users().await?)?,
        },
        Command::Tx(tx) => match tx.command {
            TxCommand::Add(args) => {
                let draft = TransactionDraft {
                    user_id: Some(args.user),
                    description: Some(args.description),
                    amount: Some(loose_number(&args.amount)),
                    category: Some(args.category),
                };
                print_json(&engine.create_transaction(&draft).await?)?;
            }
            TxCommand::Update(args) => {
                let patch = TransactionPatch {
                    description: args.description.map(Some),
                    amount: args.amount.as_deref().map(loose_number),
                    category: args.category.map(Some),
                };
                print_json(&engine.update_transaction(args.id, &patch).await?)?;
            }
            TxCommand::Delete { id } => {
                report_delete(engine.delete_transaction(id).await?, "transaction")
            }
            TxCommand::List { user: Some(user) } => {
                print_json(&engine.user_transactions(user).await?)?
            }
            TxCommand::List { user: None } => print_json(&engine.transactions().await?)?,
        },
        Command::Budget(budget) => match budget.command {
            BudgetCommand::Set { user, budget } => {
                let patch = BudgetPatch::new(loose_number(&budget));
                print_json(&engine.set_budget(user, &patch).await?)?;
            }
        },
        Command::Report { user } => print_json(&engine.budget_report(user).await?)?,
        Command::Monthly { user } => print_summary(engine.monthly_summary(user, today).await?),
        Command::Weekly { user } => print_summary(engine.weekly_summary(user, today).await?),
        Command::Last7 { user } => println!("{:.2}", engine.total_last_7_days(user, today).await),
        Command::Export { user } => engine.export_csv(user, std::io::stdout().lock()).await?,
    }

    Ok(())
}

/// Command-line numbers arrive as text. Anything that does not parse is
/// passed on as a string so the engine reports the type error.
fn loose_number(raw: &str) -> Value {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(entry: SummaryEntry) {
    if entry.is_error() {
        eprintln!("error: {}", entry.text());
    } else {
        println!("{}", entry.text());
    }
}

fn report_delete(removed: bool, what: &str) {
    if removed {
        println!("{what} deleted");
    } else {
        println!("no {what} removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_becomes_a_number() {
        assert_eq!(loose_number(" 12.5 "), Value::from(12.5));
    }

    #[test]
    fn other_text_stays_a_string() {
        assert_eq!(loose_number("lots"), Value::String("lots".to_string()));
        assert_eq!(loose_number("NaN"), Value::String("NaN".to_string()));
    }
}

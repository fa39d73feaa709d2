//! Schema maintenance for the sqlite backend.
//!
//! `migration [up [N] | down [N] | fresh | status]`, against `DATABASE_URL`
//! or `./budgetline.db`.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./budgetline.db?mode=rwc";
const USAGE: &str = "usage: migration [up [N] | down [N] | fresh | status]";

enum Step {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Status,
}

fn parse_step(mut args: impl Iterator<Item = String>) -> Option<Step> {
    let command = args.next().unwrap_or_else(|| "up".to_string());
    let count = match args.next() {
        Some(raw) => Some(raw.parse::<u32>().ok()?),
        None => None,
    };
    match (command.as_str(), count) {
        ("up", count) => Some(Step::Up(count)),
        ("down", count) => Some(Step::Down(count)),
        ("fresh", None) => Some(Step::Fresh),
        ("status", None) => Some(Step::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(step) = parse_step(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&url).await?;

    match step {
        Step::Up(count) => migration::Migrator::up(&db, count).await?,
        Step::Down(count) => migration::Migrator::down(&db, count).await?,
        Step::Fresh => migration::Migrator::fresh(&db).await?,
        Step::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ledger_core::parse_ledger_date;

#[derive(Debug, Parser)]
#[command(name = "ledger")]
#[command(about = "Collect daily coding-assistant usage and sync it to your ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect usage for a day (or the last few days) and submit it
    Push(PushArgs),
    /// Store the access token issued by the ledger service
    Login {
        #[arg(long)]
        token: String,
        /// Ledger service base URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Show configuration and the last successful push
    Status,
}

#[derive(Debug, Args)]
pub struct PushArgs {
    /// Single day to push (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with = "days")]
    pub date: Option<NaiveDate>,
    /// Push this many trailing days ending today (capped at the backfill window)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,
    /// Print the summary without submitting
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_ledger_date(value).ok_or_else(|| format!("invalid date {value:?}, expected YYYY-MM-DD"))
}

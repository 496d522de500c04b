mod args;
mod config;
mod paths;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use collect::{
    LedgerClient, PushOptions, SourceAdapter, SourceTool, SyncClient, SyncState, ToolResolver,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command, PushArgs};
use crate::config::CliConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = paths::config_file()?;
    let loaded = config::load_or_create(&config_file)?;
    if loaded.created {
        eprintln!("Created config at {}.", loaded.file.display());
    }

    match cli.command {
        Command::Push(args) => push(loaded.config.with_env_overrides(), args).await,
        Command::Login { token, api_url } => {
            let mut config = loaded.config;
            config.token = Some(token);
            if let Some(api_url) = api_url {
                config.api_url = api_url;
            }
            config::save(&loaded.file, &config)?;
            println!("Saved token for {}.", config.api_url);
            Ok(())
        }
        Command::Logout => {
            let mut config = loaded.config;
            let had_token = config.token.take().is_some();
            config::save(&loaded.file, &config)?;
            if had_token {
                println!("Logged out.");
            } else {
                println!("No token was stored.");
            }
            Ok(())
        }
        Command::Status => status(&loaded.file, loaded.config.with_env_overrides()),
    }
}

async fn push(config: CliConfig, args: PushArgs) -> Result<()> {
    let resolver = ToolResolver::new();
    let primary = SourceAdapter::resolve(SourceTool::ClaudeCode, &resolver);
    let secondary = SourceAdapter::resolve(SourceTool::Codex, &resolver);
    let submitter = LedgerClient::new(config.api_url, config.token);
    let today = Local::now().date_naive();
    let client = SyncClient::new(primary, secondary, submitter, paths::state_file()?, today);

    let options = PushOptions {
        date: args.date,
        days: args.days,
        dry_run: args.dry_run,
    };
    let mut stdout = io::stdout().lock();
    let report = client.push(options, &mut stdout).await?;
    tracing::debug!(
        since = %report.range.since,
        until = %report.range.until,
        entries = report.entries.len(),
        hash = %report.hash,
        "push finished"
    );
    stdout.flush().context("flush stdout")?;
    Ok(())
}

fn status(file: &std::path::Path, config: CliConfig) -> Result<()> {
    let state = SyncState::load(&paths::state_file()?)?;
    println!("Config:      {}", file.display());
    println!("API URL:     {}", config.api_url);
    println!(
        "Token:       {}",
        if config.token.is_some() {
            "present"
        } else {
            "not set (run `ledger login --token <TOKEN>`)"
        }
    );
    println!(
        "Last push:   {}",
        state.last_pushed_date.as_deref().unwrap_or("never")
    );
    Ok(())
}

mod config;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use app_api::AppContext;
use chrono::Utc;
use clap::Parser;
use http_api::HttpState;
use ledger_app::{
    AppConfig, AppPaths, AppState, ensure_app_data_dir, format_timestamp, spawn_badge_worker,
    token_secret_from_env,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ledger-server")]
#[command(about = "Usage ledger ingestion server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct ServerArgs {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured port for this run only
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = ServerArgs::parse();
    let config = config::load(args.config.as_deref())?;
    let token_secret = token_secret_from_env()?;

    let paths = AppPaths::new(config.data_dir()?);
    ensure_app_data_dir(&paths)?;
    tracing::info!(data_dir = %paths.app_data_dir.display(), "using data dir");

    let mut app_config = AppConfig::new(paths.db_path, token_secret);
    app_config.public_url = config.public_url();
    app_config.backfill_days = config.backfill_days;
    let app_state = AppState::new(app_config);
    app_state
        .setup_db()
        .context("failed to initialize database")?;

    let expired = app_state
        .open_db()?
        .delete_expired_sessions(&format_timestamp(Utc::now()))
        .context("failed to prune sessions")?;
    if expired > 0 {
        tracing::info!(expired, "pruned expired web sessions");
    }

    let (badges, _worker) = spawn_badge_worker(app_state.services.badges.clone());
    let context = AppContext { app_state, badges };
    let router = http_api::router(HttpState::new(context));

    let port = args.port.unwrap_or(config.port);
    let (listener, actual_port, used_fallback) = bind_port(config.bind, port).await?;
    if used_fallback {
        tracing::warn!(port, actual_port, "configured port unavailable; using fallback");
    }
    let address = SocketAddr::new(config.bind, actual_port);
    tracing::info!(%address, "ledger server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("ledger server stopped");
    Ok(())
}

async fn bind_port(
    bind: IpAddr,
    port: u16,
) -> Result<(tokio::net::TcpListener, u16, bool), std::io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::new(bind, 0)).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    match tokio::net::TcpListener::bind(SocketAddr::new(bind, port)).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener = tokio::net::TcpListener::bind(SocketAddr::new(bind, 0)).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

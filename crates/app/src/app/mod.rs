use std::path::PathBuf;

use ledger_core::MAX_BACKFILL_DAYS;
use ledger_db::Db;

use crate::config::DEFAULT_PUBLIC_URL;
use crate::error::Result;
use crate::services::AppServices;

/// Everything the ingestion server needs to serve requests.
#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Base for the post links returned to submitters.
    pub public_url: String,
    pub backfill_days: i64,
    pub token_secret: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("public_url", &self.public_url)
            .field("backfill_days", &self.backfill_days)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn new(db_path: PathBuf, token_secret: impl Into<String>) -> Self {
        Self {
            db_path,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            backfill_days: MAX_BACKFILL_DAYS,
            token_secret: token_secret.into(),
        }
    }

    pub fn post_url(&self, post_id: i64) -> String {
        format!("{}/posts/{}", self.public_url.trim_end_matches('/'), post_id)
    }
}

/// Application state shared by the HTTP layer and background workers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}

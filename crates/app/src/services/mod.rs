mod auth;
mod badges;
mod ingestion;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use ledger_db::Db;

pub use auth::{AuthMethod, AuthService, Identity};
pub use badges::{Badge, BadgeService};
pub use ingestion::IngestionService;

type SharedConfig = Arc<AppConfig>;

/// Service registry for server operations.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub ingestion: IngestionService,
    pub badges: BadgeService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            auth: AuthService::new(shared.clone()),
            ingestion: IngestionService::new(shared.clone()),
            badges: BadgeService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

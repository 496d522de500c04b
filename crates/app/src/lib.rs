pub mod achievements;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod title;
pub mod util;

pub use achievements::{BadgeJob, BadgeQueue, run_badge_worker, spawn_badge_worker};
pub use app::{AppConfig, AppState, setup_db};
pub use auth::{TOKEN_LIFETIME_DAYS, TokenClaims, TokenSigner};
pub use config::{DEFAULT_PUBLIC_URL, TOKEN_SECRET_ENV, token_secret_from_env};
pub use error::{ApiError, AppError, Result};
pub use services::{AppServices, AuthMethod, AuthService, Badge, BadgeService, Identity};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use title::{friendly_model_name, post_title};
pub use util::time::{earliest_today, format_timestamp, ledger_today};

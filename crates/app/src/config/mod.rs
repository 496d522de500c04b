use crate::error::{AppError, Result};

pub const TOKEN_SECRET_ENV: &str = "LEDGER_TOKEN_SECRET";
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3845";

/// Reads the token signing secret. The server refuses to start without one.
pub fn token_secret_from_env() -> Result<String> {
    match std::env::var(TOKEN_SECRET_ENV) {
        Ok(secret) if !secret.trim().is_empty() => Ok(secret),
        _ => Err(AppError::Config(format!("{TOKEN_SECRET_ENV} is not set"))),
    }
}

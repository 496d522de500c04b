use ledger_core::{DateRejection, UsageValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Db(#[from] ledger_db::DbError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    /// Deliberately carries no detail about which credential was tried.
    #[error("unauthorized")]
    Unauthorized,
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<UsageValidationError> for AppError {
    fn from(err: UsageValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<DateRejection> for AppError {
    fn from(err: DateRejection) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::InvalidInput(_) => (400, Some("invalid_input".to_string())),
            AppError::Unauthorized => (401, Some("unauthorized".to_string())),
            AppError::Db(_)
            | AppError::Io(_)
            | AppError::Serde(_)
            | AppError::Config(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}

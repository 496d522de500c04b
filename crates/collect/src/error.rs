use std::io;

use ledger_core::{DateRejection, UsageValidationError};

/// Failures while running or parsing one external reporter.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: &'static str, secs: u64 },
    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: &'static str,
        status: String,
        stderr: String,
    },
    #[error("{tool} output exceeded {limit} bytes")]
    OutputTooLarge { tool: &'static str, limit: usize },
    #[error("{tool} io error: {source}")]
    Io {
        tool: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{tool} returned invalid JSON: {source}")]
    Json {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{tool} returned an unexpected payload: {message}")]
    Schema { tool: &'static str, message: String },
    #[error("{tool} returned an invalid entry: {source}")]
    Invalid {
        tool: &'static str,
        #[source]
        source: UsageValidationError,
    },
}

/// Failures while talking to the ledger service.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("not logged in: run `ledger login --token <TOKEN>` first")]
    MissingToken,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected submission ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Date(#[from] DateRejection),
    #[error(transparent)]
    Primary(#[from] CollectError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("sync state error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, CollectError>;

use chrono::{DateTime, Utc};
use ledger_app::{AppError, Identity, Result};
use ledger_core::{SubmissionBatch, SubmitResponse};

use crate::{AppContext, HealthResponse};

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }
}

pub fn authenticate(
    ctx: &AppContext,
    bearer: Option<&str>,
    session: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Identity> {
    ctx.app_state.services.auth.resolve(bearer, session, now)
}

/// Parses and ingests a raw `POST /api/usage` body, then queues badge evaluation.
pub fn submit_usage(
    ctx: &AppContext,
    identity: &Identity,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<SubmitResponse> {
    let batch: SubmissionBatch = serde_json::from_slice(body)
        .map_err(|err| AppError::InvalidInput(format!("invalid JSON body: {}", err)))?;
    let response = ctx
        .app_state
        .services
        .ingestion
        .submit(identity, &batch, now)?;
    ctx.badges.enqueue(&identity.user_id);
    Ok(response)
}

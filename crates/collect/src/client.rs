use async_trait::async_trait;
use ledger_core::{SubmissionBatch, SubmitResponse};
use serde::Deserialize;

use crate::error::SubmitError;

/// Delivers a batch to the ledger service.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, batch: &SubmissionBatch) -> Result<SubmitResponse, SubmitError>;
}

/// HTTP client that attaches the stored bearer token to every submission.
/// The token is never refreshed; an expired one surfaces as a 401.
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub fn usage_url(&self) -> String {
        format!("{}/api/usage", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Submitter for LedgerClient {
    async fn submit(&self, batch: &SubmissionBatch) -> Result<SubmitResponse, SubmitError> {
        let token = self.token.as_deref().ok_or(SubmitError::MissingToken)?;
        let response = self
            .http
            .post(self.usage_url())
            .bearer_auth(token)
            .json(batch)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<SubmitResponse>().await?)
    }
}

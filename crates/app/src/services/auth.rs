use chrono::{DateTime, Utc};

use crate::auth::TokenSigner;
use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};
use crate::util::time::format_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Bearer,
    Session,
}

/// The caller a request is acting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: Option<String>,
    pub method: AuthMethod,
}

#[derive(Clone)]
pub struct AuthService {
    config: SharedConfig,
    signer: TokenSigner,
}

impl AuthService {
    pub(super) fn new(config: SharedConfig) -> Self {
        let signer = TokenSigner::new(&config.token_secret);
        Self { config, signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Mints a bearer token for a user, as the pairing flow does.
    pub fn issue_token(
        &self,
        user_id: &str,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        self.signer.issue(user_id, username, now)
    }

    /// Bearer token first, then the session cookie. The bearer check runs whenever a
    /// token is present; an invalid one falls through to the session.
    pub fn resolve(
        &self,
        bearer: Option<&str>,
        session: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity> {
        if let Some(claims) = bearer.and_then(|token| self.signer.verify(token, now)) {
            return Ok(Identity {
                user_id: claims.sub,
                username: claims.username,
                method: AuthMethod::Bearer,
            });
        }

        if let Some(token) = session.filter(|token| !token.is_empty()) {
            let db = open_db(&self.config)?;
            if let Some(found) = db.session_identity(token, &format_timestamp(now))? {
                return Ok(Identity {
                    user_id: found.user_id,
                    username: found.username,
                    method: AuthMethod::Session,
                });
            }
        }

        Err(AppError::Unauthorized)
    }
}

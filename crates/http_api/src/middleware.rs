use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderMap, Request, StatusCode,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{errors::HttpError, state::HttpState};

pub const SESSION_COOKIE: &str = "ledger_session";

/// Resolves the caller and stores the `Identity` in request extensions.
pub async fn require_identity(
    State(state): State<HttpState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let bearer = bearer_token(req.headers());
    let session = session_cookie(req.headers());
    // Session lookups hit the database.
    let context = state.context.clone();
    let identity = tokio::task::spawn_blocking(move || {
        app_api::authenticate(&context, bearer.as_deref(), session.as_deref(), Utc::now())
    })
    .await
    .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None))??;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

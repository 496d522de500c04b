use axum::{
    Extension,
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use ledger_app::Identity;

use crate::{errors::HttpError, state::HttpState};

pub async fn health() -> impl IntoResponse {
    Json(app_api::health())
}

pub async fn submit_usage(
    State(state): State<HttpState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || {
        app_api::submit_usage(&context, &identity, &body, Utc::now())
    })
    .await
    .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None))??;
    Ok(Json(response))
}

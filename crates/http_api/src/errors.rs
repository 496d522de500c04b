use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledger_app::{ApiError, AppError};

/// JSON error body with a status that mirrors it.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: Option<String>) -> Self {
        let body = ApiError {
            status: status.as_u16(),
            message: message.into(),
            code,
        };
        Self { status, body }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let api_error = ApiError::from(err);
        let status =
            StatusCode::from_u16(api_error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: api_error,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                message = %self.body.message,
                "request failed"
            );
        } else {
            tracing::debug!(
                status = self.status.as_u16(),
                message = %self.body.message,
                "request rejected"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

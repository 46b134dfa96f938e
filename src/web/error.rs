use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// A failed request, reported as `{ error, detail }`.
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    detail: String,
}

impl ApiError {
    /// Analysis failure, reported as 500.
    pub fn new(message: &'static str, source: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
            detail: format!("{:#}", source),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: "Invalid Request Body",
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.message, self.detail);
        } else {
            warn!("{}: {}", self.message, self.detail);
        }

        let body = Json(json!({
            "error": self.message,
            "detail": self.detail,
        }));

        (self.status, body).into_response()
    }
}

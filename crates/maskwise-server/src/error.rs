//! HTTP error responses. Every failure is rendered as `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use maskwise_core::Error;

#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded.
    BadRequest(String),
    /// Method not supported on this route.
    MethodNotAllowed(&'static str),
    Core(Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Core(err) => match err {
                Error::InvalidSpan { .. }
                | Error::DetectorUnavailable(_)
                | Error::GeneratorFailure(_) => StatusCode::BAD_GATEWAY,
                Error::NoGenerator => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::MethodNotAllowed(msg) => (*msg).to_string(),
            Self::Core(err) => err.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.message());
        }
        (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}

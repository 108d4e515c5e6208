use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use murmur_core::MurmurError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by HTTP handlers, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "audio not found (expired or invalid id)",
        )
    }
}

impl From<MurmurError> for ApiError {
    fn from(err: MurmurError) -> Self {
        match err {
            MurmurError::InvalidInput(detail) => Self::new(StatusCode::BAD_REQUEST, detail),
            MurmurError::NotFound(_) => Self::not_found(),
            MurmurError::Synthesis(detail) => {
                warn!(target: "http", detail = %detail, "Synthesis failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("TTS failed: {detail}"),
                )
            }
            other => {
                error!(target: "http", error = %other, "Unexpected error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

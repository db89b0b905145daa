use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::amp::AmpError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Upstream error: {message}")]
    Upstream { message: String, detail: String },
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
            AppError::Upstream { message, detail } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": message, "detail": detail }),
            ),
            AppError::InternalServerError(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "detail": detail }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AmpError> for AppError {
    fn from(err: AmpError) -> Self {
        match err {
            AmpError::NotConfigured => {
                AppError::ServiceUnavailable(AmpError::NotConfigured.to_string())
            }
            other => AppError::Upstream {
                message: "Failed to fetch module list from game panel".to_string(),
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::Upstream { message: "x".into(), detail: "y".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::InternalServerError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_amp_error_mapping() {
        assert!(matches!(
            AppError::from(AmpError::NotConfigured),
            AppError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(AmpError::UnexpectedShape("no list".into())),
            AppError::Upstream { .. }
        ));
    }
}

//! API error handling.
//!
//! Handlers return `ApiResult<T>`; every repository and domain error converts
//! into the shared `AppError` and renders as `{"error": CODE, "message": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_shared::AppError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Shorthand for a 400 with `message`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Consistency(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg.clone(),
        };

        if self.0.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.0.error_code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(AppError::NotFound("gone".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::Conflict("clash".into()), StatusCode::CONFLICT, "STATE_CONFLICT")]
    #[case(
        AppError::Consistency("drift".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "CONSISTENCY_ERROR"
    )]
    #[case(
        AppError::Database("down".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "DATABASE_ERROR"
    )]
    #[tokio::test]
    async fn test_error_renders_status_and_code(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), status);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], code);
        assert!(body["message"].is_string());
    }

    #[test]
    fn test_conversion_from_domain_error() {
        let err: ApiError = tally_core::reports::ReportError::InvalidDateRange {
            start: chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

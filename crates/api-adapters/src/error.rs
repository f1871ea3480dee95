//! Maps `DomainError` onto HTTP status codes and a small JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;

/// Wrapper so handlers can use `?` on service results.
pub struct ApiError(pub DomainError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DomainError::NotFound(..) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::AlreadyClaimed(_) => (StatusCode::CONFLICT, "already_claimed"),
            DomainError::AlreadyCompleted(_) => (StatusCode::CONFLICT, "already_completed"),
            DomainError::AlreadyStarted(_) => (StatusCode::CONFLICT, "already_started"),
            DomainError::NotStarted(_) => (StatusCode::CONFLICT, "not_started"),
            DomainError::NotDeletable(_) => (StatusCode::CONFLICT, "not_deletable"),
            DomainError::WrongAssignee(_) => (StatusCode::FORBIDDEN, "wrong_assignee"),
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            DomainError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input"),
            DomainError::InsufficientPoints { .. } => {
                (StatusCode::PAYMENT_REQUIRED, "insufficient_points")
            }
            DomainError::RequirementsNotMet(_) => {
                (StatusCode::PRECONDITION_FAILED, "requirements_not_met")
            }
            DomainError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
                code,
            }),
        )
            .into_response()
    }
}

//! Typed errors for the attendance API, mapped onto HTTP responses.

use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Everything a handler can fail with. Implements
/// [`actix_web::ResponseError`], so handlers return `Result<_, ApiError>`
/// and let `?` do the propagation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{what} not found")]
    NotFound { what: String },

    /// Clock-out without a record for today.
    #[error("No clock-in record found for today. Please clock in first.")]
    NoActiveClockIn,

    /// Second review of a correction request that already left SUBMITTED.
    #[error("This request has already been reviewed")]
    AlreadyReviewed,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Underlying store failure; surfaced as an opaque 500.
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound { what: what.into() }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::NoActiveClockIn
            | ApiError::AlreadyReviewed
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Persistence(e) => {
                error!(error = %e, "Database error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_carries_the_subject() {
        let err = ApiError::not_found("Attendance record with ID 17");
        assert_eq!(err.to_string(), "Attendance record with ID 17 not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn clock_out_precondition_is_a_bad_request() {
        let err = ApiError::NoActiveClockIn;
        assert_eq!(
            err.to_string(),
            "No clock-in record found for today. Please clock in first."
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repeated_review_is_a_bad_request() {
        let err = ApiError::AlreadyReviewed;
        assert_eq!(err.to_string(), "This request has already been reviewed");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_failures_map_to_500() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn forbidden_keeps_its_message() {
        let err = ApiError::Forbidden("Admin or HR role required".to_string());
        assert_eq!(err.to_string(), "Admin or HR role required");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}

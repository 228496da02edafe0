use std::collections::BTreeMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, dto::validation::field_messages};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed while serving the request.
    #[error("storage failure")]
    Storage(#[from] StorageError),
    /// Create/update payload failed validation.
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Payload rejected by validation; every failing field is reported.
    #[error("validation failed")]
    Validation(ValidationErrors),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Internal server error; details are logged, never returned.
    #[error("internal server error")]
    Internal,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => {
                error!(error = %source, detail = ?source, "storage operation failed");
                AppError::Internal
            }
            ServiceError::Validation(errors) => AppError::Validation(errors),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let errors = match &self {
            AppError::Validation(errors) => Some(field_messages(errors)),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            errors,
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use validator::ValidationError;

    use super::*;

    #[test]
    fn storage_failures_hide_details() {
        let err = StorageError::Malformed {
            message: "secret detail".into(),
        };
        let app: AppError = ServiceError::from(err).into();
        assert!(matches!(app, AppError::Internal));
        assert_eq!(app.to_string(), "internal server error");
    }

    #[test]
    fn statuses_follow_error_kind() {
        let mut errors = ValidationErrors::new();
        errors.add("name", ValidationError::new("required"));

        let cases = [
            (AppError::Validation(errors), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn not_found_message_is_passed_through() {
        let app: AppError = ServiceError::NotFound("game with id 9 not found".into()).into();
        assert_eq!(app.to_string(), "game with id 9 not found");
    }
}

use thiserror::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// A required field is missing or a value failed normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")] MissingField(&'static str),
    #[error("{0} must contain at least one item")] EmptyList(&'static str),
    #[error("Invalid date format: '{0}'")] InvalidDate(String),
    #[error("Invalid time format: '{0}'. Use HH:MM format")] InvalidTime(String),
    #[error("Please provide a valid email address")] InvalidEmail(String),
    #[error("{0}")] Malformed(String),
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error("{0}")] Uniqueness(String),
    #[error("{0}")] ReferentialIntegrity(String),
    #[error("{0}")] NotFound(String),
    #[error("backend configuration error: {0}")] BackendConfiguration(String),
    #[error("unexpected error: {0}")] Unexpected(anyhow::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")] BadRequest(String),
    #[error("{0}")] NotFound(String),
    #[error("{0}")] Conflict(String),
    #[error("{message}")] Internal { message: String, detail: Option<String> },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Internal { message: message.into(), detail: Some(detail.to_string()) }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Validation(v) => ApiError::BadRequest(v.to_string()),
            RecordError::Uniqueness(m) => ApiError::Conflict(m),
            RecordError::ReferentialIntegrity(m) => ApiError::BadRequest(m),
            RecordError::NotFound(m) => ApiError::NotFound(m),
            RecordError::BackendConfiguration(m) => ApiError::internal("Database configuration error", m),
            RecordError::Unexpected(e) => ApiError::internal("An unexpected error occurred", e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error_code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg, detail) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", m, None),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "NOT_FOUND", m, None),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, "CONFLICT", m, None),
            ApiError::Internal { message, detail } => {
                tracing::error!(reason = %message, detail = ?detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message, detail)
            }
        };
        if status.is_client_error() {
            tracing::debug!(%status, reason = %msg, "request rejected");
        }
        let body = axum::Json(ErrorBody { error_code: code, message: msg, error: detail });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_errors_map_to_client_and_server_statuses() {
        let cases = [
            (RecordError::from(ValidationError::EmptyList("Agenda")), StatusCode::BAD_REQUEST),
            (RecordError::Uniqueness("dup".into()), StatusCode::CONFLICT),
            (RecordError::ReferentialIntegrity("Referenced event does not exist".into()), StatusCode::BAD_REQUEST),
            (RecordError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (RecordError::BackendConfiguration("no url".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (RecordError::Unexpected(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn validation_messages_name_the_field() {
        assert_eq!(ValidationError::EmptyList("Agenda").to_string(), "Agenda must contain at least one item");
        assert_eq!(ValidationError::MissingField("Title").to_string(), "Title is required");
    }

    #[test]
    fn backend_errors_hide_detail_from_message() {
        let api = ApiError::from(RecordError::BackendConfiguration("DATABASE_URL missing".into()));
        match api {
            ApiError::Internal { message, detail } => {
                assert_eq!(message, "Database configuration error");
                assert_eq!(detail.as_deref(), Some("DATABASE_URL missing"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

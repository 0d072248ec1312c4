use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::StudentError;

/// Errors a REST handler can return, rendered as `{ "error": ... }`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Solicitud inválida: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Student(#[from] StudentError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Student(StudentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Student(StudentError::ConcurrentUpdate { .. }) => StatusCode::CONFLICT,
            ApiError::Student(StudentError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Student(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StudentError::AlreadyCheckedInToday).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StudentError::InvalidAmount).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StudentError::not_found("1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StudentError::AlreadyExists { dni: "1".to_string() }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StudentError::ConcurrentUpdate { dni: "1".to_string() }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StudentError::Storage(anyhow::anyhow!("disk full"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MalformedPayload("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_check_in_conflict_message() {
        let error = ApiError::from(StudentError::AlreadyCheckedInToday);

        assert_eq!(error.to_string(), "Ya se registró un ingreso hoy");
    }
}

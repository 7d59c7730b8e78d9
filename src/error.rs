use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Public error taxonomy. Every variant maps to a stable machine-readable
/// kind plus a human message; downstream causes are logged, never echoed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("account already exists")]
    DuplicateAccount,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("folder not found or not owned")]
    InvalidFolder,
    #[error("{0}")]
    ValidationFailed(String),
    #[error("internal error")]
    Downstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "missing_field",
            ApiError::DuplicateAccount => "duplicate_account",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InvalidFolder => "invalid_folder",
            ApiError::ValidationFailed(_) => "validation_failed",
            ApiError::Downstream(_) => "downstream_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::DuplicateAccount
            | ApiError::InvalidFolder
            | ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Downstream(e) = &self {
            error!(error = ?e, "downstream failure");
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses_are_stable() {
        assert_eq!(ApiError::MissingField("email").kind(), "missing_field");
        assert_eq!(
            ApiError::MissingField("email").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateAccount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized("missing Authorization header").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidFolder.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ValidationFailed("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Downstream(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn downstream_message_does_not_leak_cause() {
        let err = ApiError::Downstream(anyhow::anyhow!("connection to db-secret-host refused"));
        assert_eq!(err.to_string(), "internal error");
    }

    #[test]
    fn login_failure_message_is_uniform() {
        // unknown email and wrong password must be indistinguishable
        let a = ApiError::InvalidCredentials;
        let b = ApiError::InvalidCredentials;
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.to_string(), b.to_string());
    }
}

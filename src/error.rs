//! Typed errors and HTTP mapping.

use crate::config::StatusTable;
use crate::model::OutcomeKind;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config load: {0}")]
    Load(String),
    #[error("config parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// One field violation collected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub field: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(field: &str, code: &str, param: Option<String>, message: String) -> Self {
        ErrorMessage {
            field: field.to_string(),
            code: code.to_string(),
            param,
            message,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("decode: {0}")]
    Decode(String),
    #[error("validation failed ({} errors)", .0.len())]
    Validation(Vec<ErrorMessage>),
    #[error("id mismatch: path '{path}', body '{body}'")]
    IdentityMismatch { path: String, body: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Vec<ErrorMessage>,
}

impl AppError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            AppError::Decode(_) => OutcomeKind::DecodeError,
            AppError::Validation(_) => OutcomeKind::ValidationError,
            AppError::IdentityMismatch { .. } => OutcomeKind::IdentityMismatch,
            AppError::BadRequest(_) => OutcomeKind::BadRequest,
            AppError::NotFound(_) => OutcomeKind::NotFound,
            AppError::Conflict(_) => OutcomeKind::Conflict,
            AppError::Config(_) | AppError::Db(_) | AppError::Serialization(_) => OutcomeKind::Error,
        }
    }

    /// Client-facing body. Internal failures carry a generic message only.
    pub fn body(self) -> ErrorBody {
        let kind = self.kind();
        let (message, details) = match self {
            AppError::Validation(errs) => ("validation failed".to_string(), errs),
            _ if kind == OutcomeKind::Error => ("internal server error".to_string(), Vec::new()),
            e => (e.to_string(), Vec::new()),
        };
        ErrorBody {
            error: ErrorDetail {
                code: kind.code().to_string(),
                message,
                details,
            },
        }
    }

    pub fn into_response_with(self, table: &StatusTable) -> Response {
        let status = table.status(self.kind());
        (status, Json(self.body())).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(&StatusTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn db_errors_hide_detail() {
        let body = AppError::Db(sqlx::Error::PoolTimedOut).body();
        assert_eq!(body.error.code, "internal_error");
        assert_eq!(body.error.message, "internal server error");
        assert!(body.error.details.is_empty());
    }

    #[test]
    fn validation_carries_details() {
        let err = AppError::Validation(vec![ErrorMessage::new("id", "required", None, "id is required".into())]);
        assert_eq!(err.kind(), OutcomeKind::ValidationError);
        let body = err.body();
        assert_eq!(body.error.code, "validation_error");
        assert_eq!(body.error.details.len(), 1);
    }

    #[test]
    fn default_mapping() {
        let res = AppError::NotFound("u1".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = AppError::Conflict("u1".into()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}

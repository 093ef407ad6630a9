use crate::error::{ErrorBody, ErrorDetail};
use crate::model::OutcomeKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;

/// Panic handler for `CatchPanicLayer::custom`: logs the payload and answers 500 with a JSON error body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    let body = ErrorBody {
        error: ErrorDetail {
            code: OutcomeKind::Error.code().to_string(),
            message: "internal server error".into(),
            details: Vec::new(),
        },
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

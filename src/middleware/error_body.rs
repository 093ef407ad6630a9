use crate::error::{ErrorBody, ErrorDetail};
use axum::{
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};

/// Rewrites error responses produced outside the handlers (408 timeout, 413 body limit,
/// 404/405 routing) into the JSON error body. Responses that are already JSON pass through.
pub async fn json_error_body(res: Response) -> Response {
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let reason = status.canonical_reason().unwrap_or("error").to_ascii_lowercase();
    let body = ErrorBody {
        error: ErrorDetail {
            code: reason.replace([' ', '-'], "_"),
            message: reason,
            details: Vec::new(),
        },
    };
    let (mut parts, _) = res.into_parts();
    parts.headers.remove(CONTENT_TYPE);
    parts.headers.remove(CONTENT_LENGTH);
    let mut out = (status, Json(body)).into_response();
    out.headers_mut().extend(parts.headers);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(res: Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_timeout_becomes_json() {
        let res = http::Response::builder()
            .status(StatusCode::REQUEST_TIMEOUT)
            .body(Body::empty())
            .unwrap();
        let res = json_error_body(res).await;
        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        let body = body_json(res).await;
        assert_eq!(body["error"]["code"], "request_timeout");
        assert_eq!(body["error"]["message"], "request timeout");
        assert_eq!(body["error"]["details"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn json_errors_pass_through() {
        let res = (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": { "code": "not_found" } }))).into_response();
        let body = body_json(json_error_body(res).await).await;
        assert_eq!(body, serde_json::json!({ "error": { "code": "not_found" } }));
    }

    #[tokio::test]
    async fn success_is_untouched() {
        let res = http::Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("ok"))
            .unwrap();
        let res = json_error_body(res).await;
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain");
    }
}

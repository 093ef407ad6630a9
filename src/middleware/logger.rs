//! Request logger: one line per request with the configured fields; query values are masked.

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::mask::Masker;
use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogFields {
    pub method: bool,
    pub uri: bool,
    pub status: bool,
    pub duration_ms: bool,
}

impl LogFields {
    pub fn parse(names: &[String]) -> Result<Self, ConfigError> {
        let mut fields = LogFields::default();
        for name in names {
            match name.as_str() {
                "method" => fields.method = true,
                "uri" => fields.uri = true,
                "status" => fields.status = true,
                "duration_ms" => fields.duration_ms = true,
                other => {
                    return Err(ConfigError::Validation(format!("unknown log field: {}", other)));
                }
            }
        }
        Ok(fields)
    }
}

#[derive(Clone)]
pub struct RequestLogger {
    fields: LogFields,
    skips: Arc<HashSet<String>>,
    masker: Masker,
}

impl RequestLogger {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(RequestLogger {
            fields: LogFields::parse(&config.log.fields)?,
            skips: Arc::new(config.middleware.skips.iter().cloned().collect()),
            masker: Masker::new(&config.middleware.masks, config.middleware.mask.clone()),
        })
    }

    fn skips(&self, path: &str) -> bool {
        self.skips.contains(path)
    }

    fn masked_uri(&self, uri: &Uri) -> String {
        match uri.query() {
            Some(q) => format!("{}?{}", uri.path(), self.masker.mask_query(q)),
            None => uri.path().to_string(),
        }
    }
}

pub async fn log_request(State(logger): State<RequestLogger>, req: Request, next: Next) -> Response {
    if logger.skips(req.uri().path()) {
        return next.run(req).await;
    }
    let method = req.method().clone();
    let uri = logger.masked_uri(req.uri());
    let start = Instant::now();
    let res = next.run(req).await;
    let f = logger.fields;
    tracing::info!(
        method = f.method.then(|| method.as_str()),
        uri = f.uri.then(|| uri.as_str()),
        status = f.status.then(|| res.status().as_u16()),
        duration_ms = f.duration_ms.then(|| start.elapsed().as_millis() as u64),
        "request"
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_fields() {
        let f = LogFields::parse(&["method".to_string(), "status".to_string()]).unwrap();
        assert!(f.method && f.status);
        assert!(!f.uri && !f.duration_ms);
    }

    #[test]
    fn masks_query_in_uri() {
        let mut config = AppConfig::default();
        config.middleware.masks = vec!["phone".into()];
        let logger = RequestLogger::new(&config).unwrap();
        let uri: Uri = "/users/search?phone=0987654321&page=1".parse().unwrap();
        assert_eq!(logger.masked_uri(&uri), "/users/search?phone=0xxx654321&page=1");
        assert!(logger.skips("/health"));
    }
}

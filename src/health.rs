//! Health checks aggregated into `GET /health`.

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait HealthChecker: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> Result<(), String>;
}

/// Pings the database with `SELECT 1` under a timeout.
pub struct SqlHealthChecker {
    pool: PgPool,
    timeout: Duration,
}

impl SqlHealthChecker {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        SqlHealthChecker { pool, timeout }
    }
}

#[async_trait]
impl HealthChecker for SqlHealthChecker {
    fn name(&self) -> &str {
        "sql"
    }

    async fn check(&self) -> Result<(), String> {
        match tokio::time::timeout(self.timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {}ms", self.timeout.as_millis())),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub details: BTreeMap<String, CheckResult>,
}

pub struct HealthHandler {
    checkers: Vec<Arc<dyn HealthChecker>>,
}

impl HealthHandler {
    pub fn new(checkers: Vec<Arc<dyn HealthChecker>>) -> Self {
        HealthHandler { checkers }
    }

    /// Runs every checker; any failure makes the service DOWN.
    pub async fn check(&self) -> Health {
        let mut details = BTreeMap::new();
        let mut up = true;
        for c in &self.checkers {
            let result = match c.check().await {
                Ok(()) => CheckResult {
                    status: "UP",
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(checker = c.name(), error = %e, "health check failed");
                    up = false;
                    CheckResult {
                        status: "DOWN",
                        error: Some(e),
                    }
                }
            };
            details.insert(c.name().to_string(), result);
        }
        Health {
            status: if up { "UP" } else { "DOWN" },
            details,
        }
    }
}

pub async fn health(State(handler): State<Arc<HealthHandler>>) -> (StatusCode, Json<Health>) {
    let health = handler.check().await;
    let status = if health.status == "UP" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

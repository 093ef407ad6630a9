//! Raw config types matching `configs/config.json`.

use crate::mask::MaskRule;
use crate::model::OutcomeKind;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sql: SqlConfig,
    pub log: LogConfig,
    pub middleware: MiddlewareConfig,
    /// Global status overrides, keyed by outcome kind.
    pub status: HashMap<OutcomeKind, u16>,
    /// Per-resource settings keyed by resource name (e.g. `user`).
    pub resources: HashMap<String, ResourceConfig>,
    pub action: ActionConfig,
    pub search: SearchConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: "user-service".into(),
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub data_source_name: String,
    pub max_connections: u32,
    pub health_timeout_secs: u64,
}

impl Default for SqlConfig {
    fn default() -> Self {
        SqlConfig {
            data_source_name: "postgres://localhost/users".into(),
            max_connections: 5,
            health_timeout_secs: 4,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// EnvFilter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Request fields recorded by the request logger: method, uri, status, duration_ms.
    pub fields: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".into(),
            fields: vec!["method".into(), "uri".into(), "status".into(), "duration_ms".into()],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Enables the request logger.
    pub log: bool,
    /// Paths the request logger ignores.
    pub skips: Vec<String>,
    /// Field and query-parameter names whose values are masked in logs.
    pub masks: Vec<String>,
    pub mask: MaskRule,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        MiddlewareConfig {
            log: true,
            skips: vec!["/health".into()],
            masks: Vec::new(),
            mask: MaskRule::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub status: HashMap<OutcomeKind, u16>,
}

/// Action names written to audit log lines.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub load: String,
    pub all: String,
    pub search: String,
    pub create: String,
    pub update: String,
    pub patch: String,
    pub delete: String,
}

impl Default for ActionConfig {
    fn default() -> Self {
        ActionConfig {
            load: "load".into(),
            all: "all".into(),
            search: "search".into(),
            create: "create".into(),
            update: "update".into(),
            patch: "patch".into(),
            delete: "delete".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_page_size: 10,
            max_page_size: 1000,
        }
    }
}

//! Load config from a JSON file, apply environment overrides, then validate.

use crate::config::types::AppConfig;
use crate::config::StatusTable;
use crate::error::ConfigError;
use crate::middleware::LogFields;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "configs/config.json";

/// Read `path`, parse it, apply process environment overrides and validate.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let mut config = parse_config(&text)?;
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Overrides: DATABASE_URL, HOST, PORT, LOG_LEVEL. Blank values are ignored.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(url) = var("DATABASE_URL") {
        config.sql.data_source_name = url;
    }
    if let Some(host) = var("HOST") {
        config.server.host = host;
    }
    if let Some(port) = var("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse(format!("PORT is not a valid port: {}", port)))?;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.log.level = level;
    }
    Ok(())
}

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.sql.data_source_name.trim().is_empty() {
        return Err(ConfigError::Validation("sql.data_source_name is required".into()));
    }
    if config.sql.max_connections == 0 {
        return Err(ConfigError::Validation("sql.max_connections must be positive".into()));
    }
    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::Validation("server.request_timeout_secs must be positive".into()));
    }
    let search = &config.search;
    if search.default_page_size == 0 || search.default_page_size > search.max_page_size {
        return Err(ConfigError::Validation(format!(
            "search.default_page_size must be in 1..={}",
            search.max_page_size
        )));
    }
    LogFields::parse(&config.log.fields)?;
    let table = StatusTable::default().with_overrides(&config.status)?;
    for (name, resource) in &config.resources {
        table
            .with_overrides(&resource.status)
            .map_err(|e| ConfigError::Validation(format!("resources.{}: {}", name, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutcomeKind;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let c = parse_config("{}").unwrap();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.search.default_page_size, 10);
        assert_eq!(c.middleware.mask.keep_start, 1);
        assert_eq!(c.action.create, "create");
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn reads_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "server": {{ "port": 9000 }},
                "status": {{ "conflict": 422 }},
                "resources": {{ "user": {{ "status": {{ "created": 200 }} }} }},
                "middleware": {{ "masks": ["phone"], "mask": {{ "keep_start": 2, "keep_end": 2, "with": "*" }} }}
            }}"#
        )
        .unwrap();
        let c = load_config(file.path()).unwrap();
        assert_eq!(c.status.get(&OutcomeKind::Conflict), Some(&422));
        assert_eq!(c.resources["user"].status.get(&OutcomeKind::Created), Some(&200));
        assert_eq!(c.middleware.mask.with, '*');
        assert_eq!(c.middleware.masks, vec!["phone".to_string()]);
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = load_config("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(parse_config("{ nope").unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://db/other"),
            ("PORT", "7001"),
            ("HOST", " "),
        ]);
        let mut c = AppConfig::default();
        apply_env(&mut c, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.sql.data_source_name, "postgres://db/other");
        assert_eq!(c.server.port, 7001);
        assert_eq!(c.server.host, "0.0.0.0");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut c = AppConfig::default();
        assert!(apply_env(&mut c, |k| (k == "PORT").then(|| "http".to_string())).is_err());
    }

    #[test]
    fn rejects_invalid_status_override() {
        let c = parse_config(r#"{ "resources": { "user": { "status": { "not_found": 1000 } } } }"#).unwrap();
        assert!(matches!(validate(&c), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_unknown_log_field() {
        let c = parse_config(r#"{ "log": { "fields": ["method", "cookie"] } }"#).unwrap();
        assert!(validate(&c).is_err());
    }
}

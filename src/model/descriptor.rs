//! Entity descriptors: explicit per-entity field metadata.
//! SQL building, search, validation, and auto-migration all read from the descriptor; identifiers
//! never come from request data.

use crate::error::ConfigError;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Varchar(u32),
    Date,
    Timestamptz,
}

impl SqlType {
    /// Column type in DDL.
    pub fn ddl(&self) -> String {
        match self {
            SqlType::Varchar(n) => format!("VARCHAR({})", n),
            SqlType::Date => "DATE".into(),
            SqlType::Timestamptz => "TIMESTAMPTZ".into(),
        }
    }

    /// Cast appended to bind placeholders (`$1::date`).
    pub fn cast(&self) -> &'static str {
        match self {
            SqlType::Varchar(_) => "varchar",
            SqlType::Date => "date",
            SqlType::Timestamptz => "timestamptz",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Varchar(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
    Phone,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub format: Option<Format>,
    pub allowed: Option<Vec<String>>,
}

impl ValidationRule {
    pub fn required() -> Self {
        ValidationRule {
            required: true,
            ..Default::default()
        }
    }

    pub fn optional() -> Self {
        ValidationRule::default()
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let re = Regex::new(pattern)
            .map_err(|e| ConfigError::Validation(format!("invalid pattern {}: {}", pattern, e)))?;
        self.pattern = Some(re);
        Ok(self)
    }
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub column: &'static str,
    pub json: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub key: bool,
    pub unique: bool,
    /// Included in free-text (`q`) search.
    pub searchable: bool,
    /// False for server-managed columns (timestamps); never written from request data.
    pub writable: bool,
    /// SQL default expression, e.g. `NOW()`.
    pub default_expr: Option<&'static str>,
    pub rule: ValidationRule,
}

impl FieldDescriptor {
    pub fn new(column: &'static str, json: &'static str, sql_type: SqlType) -> Self {
        FieldDescriptor {
            column,
            json,
            sql_type,
            nullable: false,
            key: false,
            unique: false,
            searchable: false,
            writable: true,
            default_expr: None,
            rule: ValidationRule::default(),
        }
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn managed(mut self, default_expr: &'static str) -> Self {
        self.writable = false;
        self.default_expr = Some(default_expr);
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rule = rule;
        self
    }
}

#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub fields: Vec<FieldDescriptor>,
    /// Last-modified column refreshed on every update and patch.
    pub touch_column: Option<&'static str>,
    key_index: usize,
}

impl EntityDescriptor {
    /// Build a descriptor. Exactly one field must be the key; the touch column, if any, must be a field.
    pub fn new(
        table: &'static str,
        fields: Vec<FieldDescriptor>,
        touch_column: Option<&'static str>,
    ) -> Result<Self, ConfigError> {
        let keys: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.key)
            .map(|(i, _)| i)
            .collect();
        let key_index = match keys.as_slice() {
            [i] => *i,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "table {} must have exactly one key field, found {}",
                    table,
                    keys.len()
                )))
            }
        };
        if let Some(touch) = touch_column {
            if !fields.iter().any(|f| f.column == touch) {
                return Err(ConfigError::Validation(format!(
                    "table {} touch column {} is not a field",
                    table, touch
                )));
            }
        }
        Ok(EntityDescriptor {
            table,
            fields,
            touch_column,
            key_index,
        })
    }

    pub fn key(&self) -> &FieldDescriptor {
        &self.fields[self.key_index]
    }

    pub fn by_json(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.json == name)
    }

    /// Writable fields in declaration order (key included).
    pub fn writable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.writable)
    }
}

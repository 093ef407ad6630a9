//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity descriptor.

use crate::error::AppError;
use crate::model::{EntityDescriptor, FieldDescriptor};
use crate::search::Criterion;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value and return its typed placeholder, e.g. `$2::date`.
    fn placeholder(&mut self, field: &FieldDescriptor, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, field.sql_type.cast())
    }
}

fn select_column_list(d: &EntityDescriptor) -> String {
    d.fields
        .iter()
        .map(|f| quoted(f.column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Value written to `field`. Blank strings in nullable columns are stored as NULL so they
/// never collide on a unique index.
fn stored_value(field: &FieldDescriptor, v: &Value) -> Value {
    match v {
        Value::String(s) if field.nullable && s.trim().is_empty() => Value::Null,
        other => other.clone(),
    }
}

fn value_for(values: &Map<String, Value>, field: &FieldDescriptor) -> Value {
    values
        .get(field.json)
        .map(|v| stored_value(field, v))
        .unwrap_or(Value::Null)
}

/// All rows ordered by key.
pub fn select_all(d: &EntityDescriptor) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(d),
        quoted(d.table),
        quoted(d.key().column)
    );
    q
}

pub fn select_by_key(d: &EntityDescriptor, key: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(d.key(), Value::String(key.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(d),
        quoted(d.table),
        quoted(d.key().column),
        ph
    );
    q
}

/// INSERT every writable column; missing values are bound as NULL, managed columns take their defaults.
pub fn insert(d: &EntityDescriptor, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut phs = Vec::new();
    for f in d.writable() {
        cols.push(quoted(f.column));
        phs.push(q.placeholder(f, value_for(values, f)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(d.table),
        cols.join(", "),
        phs.join(", ")
    );
    q
}

fn touch_clause(d: &EntityDescriptor, sets: &mut Vec<String>) {
    if let Some(touch) = d.touch_column {
        sets.push(format!("{} = NOW()", quoted(touch)));
    }
}

fn update_by_key(d: &EntityDescriptor, mut q: QueryBuf, mut sets: Vec<String>, key: &str) -> QueryBuf {
    touch_clause(d, &mut sets);
    if sets.is_empty() {
        let k = quoted(d.key().column);
        sets.push(format!("{} = {}", k, k));
    }
    let ph = q.placeholder(d.key(), Value::String(key.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(d.table),
        sets.join(", "),
        quoted(d.key().column),
        ph
    );
    q
}

/// Full replace: every writable non-key column is written, missing values become NULL.
pub fn update(d: &EntityDescriptor, key: &str, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in d.writable().filter(|f| !f.key) {
        let ph = q.placeholder(f, value_for(values, f));
        sets.push(format!("{} = {}", quoted(f.column), ph));
    }
    update_by_key(d, q, sets, key)
}

/// Partial update: only columns whose JSON name is present in `values` are written.
pub fn patch(d: &EntityDescriptor, key: &str, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in d.writable().filter(|f| !f.key) {
        if let Some(v) = values.get(f.json) {
            let ph = q.placeholder(f, stored_value(f, v));
            sets.push(format!("{} = {}", quoted(f.column), ph));
        }
    }
    update_by_key(d, q, sets, key)
}

pub fn delete(d: &EntityDescriptor, key: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(d.key(), Value::String(key.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(d.table),
        quoted(d.key().column),
        ph
    );
    q
}

/// WHERE clause for the given criteria; criteria naming unknown fields are skipped.
fn where_clause(d: &EntityDescriptor, criteria: &[Criterion], q: &mut QueryBuf) -> String {
    let mut parts = Vec::new();
    for c in criteria {
        match c {
            Criterion::Eq(name, v) | Criterion::Gte(name, v) | Criterion::Lte(name, v) => {
                let Some(f) = d.by_json(name) else {
                    tracing::warn!(field = %name, "search criterion on unknown field skipped");
                    continue;
                };
                let op = match c {
                    Criterion::Gte(..) => ">=",
                    Criterion::Lte(..) => "<=",
                    _ => "=",
                };
                let ph = q.placeholder(f, v.clone());
                parts.push(format!("{} {} {}", quoted(f.column), op, ph));
            }
            Criterion::Prefix(name, s) => {
                let Some(f) = d.by_json(name) else {
                    tracing::warn!(field = %name, "search criterion on unknown field skipped");
                    continue;
                };
                if f.sql_type.is_textual() {
                    let n = q.push_param(Value::String(format!("{}%", escape_like(s))));
                    parts.push(format!("{} ILIKE ${}::text", quoted(f.column), n));
                } else {
                    let ph = q.placeholder(f, Value::String(s.clone()));
                    parts.push(format!("{} = {}", quoted(f.column), ph));
                }
            }
            Criterion::Keyword(s) => {
                let cols: Vec<&FieldDescriptor> = d.fields.iter().filter(|f| f.searchable).collect();
                if cols.is_empty() {
                    continue;
                }
                let n = q.push_param(Value::String(format!("%{}%", escape_like(s))));
                let ors: Vec<String> = cols
                    .iter()
                    .map(|f| format!("{} ILIKE ${}::text", quoted(f.column), n))
                    .collect();
                parts.push(format!("({})", ors.join(" OR ")));
            }
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// ORDER BY from a sort expression like `username,-dateOfBirth`; key is the default and final tie-breaker.
pub fn order_clause(d: &EntityDescriptor, sort: Option<&str>) -> Result<String, AppError> {
    let key = d.key().column;
    let mut parts = Vec::new();
    let mut has_key = false;
    for raw in sort.unwrap_or("").split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, dir) = if let Some(rest) = raw.strip_prefix('-') {
            (rest, "DESC")
        } else {
            (raw.strip_prefix('+').unwrap_or(raw), "ASC")
        };
        let f = d
            .by_json(name)
            .ok_or_else(|| AppError::Decode(format!("cannot sort by unknown field '{}'", name)))?;
        has_key |= f.key;
        parts.push(format!("{} {}", quoted(f.column), dir));
    }
    if !has_key {
        parts.push(format!("{} ASC", quoted(key)));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

/// One page of rows matching `criteria`.
pub fn select_page(
    d: &EntityDescriptor,
    criteria: &[Criterion],
    order: &str,
    limit: u32,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(d, criteria, &mut q);
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(d),
        quoted(d.table),
        where_sql,
        order,
        limit,
        offset
    );
    q
}

pub fn count(d: &EntityDescriptor, criteria: &[Criterion]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(d, criteria, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(d.table), where_sql);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, User};
    use serde_json::json;

    fn users() -> EntityDescriptor {
        User::descriptor().unwrap()
    }

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn insert_skips_managed_columns() {
        let q = insert(&users(), &object(json!({ "id": "u1", "username": "ann", "phone": "012345" })));
        assert_eq!(
            q.sql,
            "INSERT INTO \"users\" (\"id\", \"username\", \"email\", \"phone\", \"status\", \"date_of_birth\") \
             VALUES ($1::varchar, $2::varchar, $3::varchar, $4::varchar, $5::varchar, $6::date)"
        );
        assert_eq!(q.params[0], json!("u1"));
        assert_eq!(q.params[2], Value::Null);
    }

    #[test]
    fn update_writes_every_column_and_touches() {
        let q = update(&users(), "u1", &object(json!({ "username": "ann" })));
        assert!(q.sql.starts_with("UPDATE \"users\" SET \"username\" = $1::varchar"));
        assert!(q.sql.contains("\"updated_at\" = NOW()"));
        assert!(q.sql.ends_with("WHERE \"id\" = $6::varchar"));
        assert_eq!(q.params.len(), 6);
        assert_eq!(q.params[5], json!("u1"));
    }

    #[test]
    fn patch_writes_only_present_columns() {
        let q = patch(&users(), "u1", &object(json!({ "id": "u1", "email": null, "createdAt": "x" })));
        assert_eq!(
            q.sql,
            "UPDATE \"users\" SET \"email\" = $1::varchar, \"updated_at\" = NOW() WHERE \"id\" = $2::varchar"
        );
        assert_eq!(q.params, vec![Value::Null, json!("u1")]);
    }

    #[test]
    fn single_field_patch_touches_only_that_column() {
        let q = patch(&users(), "u1", &object(json!({ "phone": "0123456789" })));
        assert_eq!(
            q.sql,
            "UPDATE \"users\" SET \"phone\" = $1::varchar, \"updated_at\" = NOW() WHERE \"id\" = $2::varchar"
        );
        assert_eq!(q.params, vec![json!("0123456789"), json!("u1")]);
    }

    #[test]
    fn update_never_writes_created_at() {
        let q = update(
            &users(),
            "u1",
            &object(json!({ "username": "ann", "createdAt": "1970-01-01T00:00:00Z", "updatedAt": "x" })),
        );
        assert!(!q.sql.contains("created_at"));
        assert_eq!(q.sql.matches("\"updated_at\"").count(), 1);
        assert!(q.sql.contains("\"updated_at\" = NOW()"));
        assert!(!q.params.contains(&json!("1970-01-01T00:00:00Z")));
    }

    #[test]
    fn blank_optional_strings_are_stored_as_null() {
        let values = object(json!({ "id": "u1", "username": "ann", "email": "", "phone": "012345", "status": " " }));
        let q = insert(&users(), &values);
        assert_eq!(q.params[2], Value::Null);
        assert_eq!(q.params[4], Value::Null);

        let q = patch(&users(), "u1", &object(json!({ "email": "" })));
        assert_eq!(q.params, vec![Value::Null, json!("u1")]);

        let q = update(&users(), "u1", &values);
        assert_eq!(q.params[1], Value::Null);
    }

    #[test]
    fn required_blank_strings_are_kept() {
        let q = insert(&users(), &object(json!({ "id": "u1", "username": "", "phone": "012345" })));
        assert_eq!(q.params[1], json!(""));
    }

    #[test]
    fn search_builds_where_and_order() {
        let criteria = vec![
            Criterion::Prefix("username", "an_n".into()),
            Criterion::Gte("dateOfBirth", json!("1990-01-01")),
            Criterion::Eq("nope", json!(1)),
        ];
        let order = order_clause(&users(), Some("-dateOfBirth")).unwrap();
        let q = select_page(&users(), &criteria, &order, 10, 20);
        assert!(q.sql.contains(
            " WHERE \"username\" ILIKE $1::text AND \"date_of_birth\" >= $2::date ORDER BY \"date_of_birth\" DESC, \"id\" ASC LIMIT 10 OFFSET 20"
        ));
        assert_eq!(q.params, vec![json!("an\\_n%"), json!("1990-01-01")]);
    }

    #[test]
    fn keyword_spans_searchable_columns() {
        let q = count(&users(), &[Criterion::Keyword("ex".into())]);
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"users\" WHERE (\"username\" ILIKE $1::text OR \"email\" ILIKE $1::text OR \"phone\" ILIKE $1::text)"
        );
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        assert!(matches!(order_clause(&users(), Some("password")), Err(AppError::Decode(_))));
    }
}

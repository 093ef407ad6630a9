//! Query execution and row decoding shared by the repository and the search builder.

use crate::error::AppError;
use crate::model::{EntityDescriptor, FieldDescriptor, SqlType};
use crate::sql::{PgBindValue, QueryBuf};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryScalar};
use sqlx::{PgPool, Postgres, Row};

fn bound(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from(p));
    }
    query
}

pub async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<PgRow>, sqlx::Error> {
    bound(q).fetch_all(pool).await
}

pub async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<PgRow>, sqlx::Error> {
    bound(q).fetch_optional(pool).await
}

/// Run a write statement; returns rows affected.
pub async fn execute(pool: &PgPool, q: &QueryBuf) -> Result<u64, sqlx::Error> {
    Ok(bound(q).execute(pool).await?.rows_affected())
}

pub async fn fetch_count(pool: &PgPool, q: &QueryBuf) -> Result<u64, sqlx::Error> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query: QueryScalar<'_, Postgres, i64, PgArguments> = sqlx::query_scalar(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from(p));
    }
    let n = query.fetch_one(pool).await?;
    Ok(u64::try_from(n).unwrap_or_default())
}

fn cell_to_value(row: &PgRow, f: &FieldDescriptor) -> Result<Value, sqlx::Error> {
    let v = match f.sql_type {
        SqlType::Varchar(_) => row
            .try_get::<Option<String>, _>(f.column)?
            .map(Value::String),
        SqlType::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(f.column)?
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        SqlType::Timestamptz => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(f.column)?
            .map(|d| Value::String(d.to_rfc3339())),
    };
    Ok(v.unwrap_or(Value::Null))
}

/// Row as a JSON object keyed by the descriptor's JSON names.
pub fn row_to_object(row: &PgRow, d: &EntityDescriptor) -> Result<Map<String, Value>, sqlx::Error> {
    let mut map = Map::new();
    for f in &d.fields {
        map.insert(f.json.to_string(), cell_to_value(row, f)?);
    }
    Ok(map)
}

pub fn decode_row<M: DeserializeOwned>(row: &PgRow, d: &EntityDescriptor) -> Result<M, AppError> {
    let obj = row_to_object(row, d)?;
    Ok(serde_json::from_value(Value::Object(obj))?)
}

/// True when the error is a unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

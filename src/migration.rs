//! Auto-migration from an entity descriptor: create the table, add missing columns, add unique indexes.
//! Idempotent; safe to run on every startup.

use crate::error::AppError;
use crate::model::{EntityDescriptor, FieldDescriptor};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_def(f: &FieldDescriptor) -> String {
    let mut def = format!("{} {}", quote(f.column), f.sql_type.ddl());
    if !f.nullable && !f.key {
        def.push_str(" NOT NULL");
    }
    if let Some(expr) = f.default_expr {
        def.push_str(" DEFAULT ");
        def.push_str(expr);
    }
    def
}

pub fn create_table_sql(d: &EntityDescriptor) -> String {
    let mut defs: Vec<String> = d.fields.iter().map(column_def).collect();
    defs.push(format!("PRIMARY KEY ({})", quote(d.key().column)));
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quote(d.table), defs.join(", "))
}

/// Statements that bring an existing table up to the descriptor.
/// Added NOT NULL columns without a default would fail on populated tables, so they are added nullable.
pub fn add_column_sql(d: &EntityDescriptor) -> Vec<String> {
    d.fields
        .iter()
        .filter(|f| !f.key)
        .map(|f| {
            let def = if f.default_expr.is_none() {
                format!("{} {}", quote(f.column), f.sql_type.ddl())
            } else {
                column_def(f)
            };
            format!("ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}", quote(d.table), def)
        })
        .collect()
}

pub fn unique_index_sql(d: &EntityDescriptor) -> Vec<String> {
    d.fields
        .iter()
        .filter(|f| f.unique && !f.key)
        .map(|f| {
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
                quote(&format!("{}_{}_key", d.table, f.column)),
                quote(d.table),
                quote(f.column)
            )
        })
        .collect()
}

pub async fn auto_migrate(pool: &PgPool, d: &EntityDescriptor) -> Result<(), AppError> {
    let mut statements = vec![create_table_sql(d)];
    statements.extend(add_column_sql(d));
    statements.extend(unique_index_sql(d));
    for sql in &statements {
        tracing::debug!(sql = %sql, "migrate");
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(table = d.table, statements = statements.len(), "table migrated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, User};

    #[test]
    fn creates_users_table() {
        let d = User::descriptor().unwrap();
        assert_eq!(
            create_table_sql(&d),
            "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" VARCHAR(40), \"username\" VARCHAR(100) NOT NULL, \
             \"email\" VARCHAR(100), \"phone\" VARCHAR(18) NOT NULL, \"status\" VARCHAR(1), \
             \"date_of_birth\" DATE, \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
             \"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW(), PRIMARY KEY (\"id\"))"
        );
    }

    #[test]
    fn adds_missing_columns_without_not_null() {
        let d = User::descriptor().unwrap();
        let stmts = add_column_sql(&d);
        assert_eq!(stmts.len(), 7);
        assert_eq!(
            stmts[0],
            "ALTER TABLE \"users\" ADD COLUMN IF NOT EXISTS \"username\" VARCHAR(100)"
        );
        assert_eq!(
            stmts[5],
            "ALTER TABLE \"users\" ADD COLUMN IF NOT EXISTS \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"
        );
    }

    #[test]
    fn unique_email_index() {
        let d = User::descriptor().unwrap();
        assert_eq!(
            unique_index_sql(&d),
            vec!["CREATE UNIQUE INDEX IF NOT EXISTS \"users_email_key\" ON \"users\" (\"email\")".to_string()]
        );
    }
}

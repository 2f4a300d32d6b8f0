//! DDL rendering from table declarations, and idempotent application.

use crate::error::AppError;
use crate::schema::def::{ColumnDef, TableDef};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn column_def_sql(c: &ColumnDef) -> String {
    let mut def = format!("{} {}", quote(&c.name), c.ty.sql_name());
    if c.primary_key {
        def.push_str(" PRIMARY KEY");
    } else if !c.nullable {
        def.push_str(" NOT NULL");
    }
    if c.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(ref d) = c.server_default {
        def.push_str(" DEFAULT ");
        def.push_str(&d.sql());
    }
    def
}

/// CREATE TABLE IF NOT EXISTS for one declaration.
pub fn create_table_sql(table: &TableDef) -> String {
    let col_defs: Vec<String> = table.columns.iter().map(column_def_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(&table.name),
        col_defs.join(",\n  ")
    )
}

/// COMMENT ON statements for the table and each commented column.
pub fn comment_sql(table: &TableDef) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(ref c) = table.comment {
        out.push(format!(
            "COMMENT ON TABLE {} IS {}",
            quote(&table.name),
            quote_literal(c)
        ));
    }
    for col in &table.columns {
        if let Some(ref c) = col.comment {
            out.push(format!(
                "COMMENT ON COLUMN {}.{} IS {}",
                quote(&table.name),
                quote(&col.name),
                quote_literal(c)
            ));
        }
    }
    out
}

/// CREATE INDEX IF NOT EXISTS for each indexed column.
pub fn index_sql(table: &TableDef) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.indexed)
        .map(|c| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote(&format!("ix_{}_{}", table.name, c.name)),
                quote(&table.name),
                quote(&c.name)
            )
        })
        .collect()
}

/// Apply DDL for every declared table: CREATE TABLE, then comments and
/// indexes. Comments and indexes are allowed to fail quietly on permission
/// differences; missing tables are not.
pub async fn apply_migrations(pool: &PgPool, tables: &[TableDef]) -> Result<(), AppError> {
    for table in tables {
        let ddl = create_table_sql(table);
        tracing::debug!(table = %table.name, "applying ddl");
        sqlx::query(&ddl).execute(pool).await?;
        for sql in comment_sql(table).iter().chain(index_sql(table).iter()) {
            let _ = sqlx::query(sql).execute(pool).await;
        }
        tracing::info!(table = %table.name, "ensured table");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{action_event, system_user};

    #[test]
    fn user_ddl_preserves_declared_types_and_defaults() {
        let ddl = create_table_sql(&system_user());
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"system_user\""));
        assert!(ddl.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(ddl.contains("\"version_id\" INTEGER NOT NULL DEFAULT 1"));
        assert!(ddl.contains("\"delete_flag\" SMALLINT NOT NULL DEFAULT 1"));
        assert!(ddl.contains("\"created_at\" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"));
        assert!(ddl.contains("\"username\" VARCHAR(60) NOT NULL UNIQUE"));
        assert!(ddl.contains("\"location_lng\" DOUBLE PRECISION"));
    }

    #[test]
    fn event_ddl_defaults_event_type_to_unknown() {
        let ddl = create_table_sql(&action_event());
        assert!(ddl.contains("\"action_event_type\" SMALLINT NOT NULL DEFAULT 1"));
        assert!(ddl.contains("\"action_event_desc\" VARCHAR(2000)"));
    }

    #[test]
    fn comments_are_emitted_for_commented_columns() {
        let comments = comment_sql(&system_user());
        assert!(comments
            .iter()
            .any(|s| s.contains("\"username\"") && s.contains("'user provided unique name'")));
        // uncommented columns emit nothing
        assert!(!comments.iter().any(|s| s.contains("\"last_login_ip\"")));
    }

    #[test]
    fn indexes_cover_the_indexed_audit_columns() {
        let indexes = index_sql(&system_user());
        assert!(indexes
            .iter()
            .any(|s| s.contains("\"ix_system_user_updated_at\"")));
        assert!(indexes
            .iter()
            .any(|s| s.contains("\"ix_system_user_updated_by\"")));
        assert_eq!(indexes.len(), 2);
    }
}

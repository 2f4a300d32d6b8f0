//! Live schema reflection: read the connected database's table and column
//! structure from the catalogs. Reflection is independent of the declared
//! registry; it feeds inspection and debugging, not routing.

use crate::error::AppError;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashSet;

#[derive(Clone, Debug, Serialize)]
pub struct ReflectedColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub server_default: Option<String>,
    pub comment: Option<String>,
    pub primary_key: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReflectedTable {
    pub name: String,
    pub columns: Vec<ReflectedColumn>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DbMetadata {
    pub tables: Vec<ReflectedTable>,
}

impl DbMetadata {
    pub fn table(&self, name: &str) -> Option<&ReflectedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Reflect every table in the public schema, with column types, nullability,
/// defaults, comments, and primary-key membership.
pub async fn reflect(pool: &PgPool) -> Result<DbMetadata, AppError> {
    let pk_rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT tc.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON kcu.constraint_name = tc.constraint_name
         AND kcu.table_schema = tc.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = 'public'
        "#,
    )
    .fetch_all(pool)
    .await?;
    let pk_columns: HashSet<(String, String)> = pk_rows.into_iter().collect();

    let col_rows: Vec<(String, String, String, String, Option<String>, Option<String>)> =
        sqlx::query_as(
            r#"
            SELECT c.table_name, c.column_name, c.data_type, c.is_nullable,
                   c.column_default,
                   col_description(pc.oid, c.ordinal_position::int)
            FROM information_schema.columns c
            JOIN pg_class pc ON pc.relname = c.table_name
            JOIN pg_namespace pn ON pn.oid = pc.relnamespace
                                AND pn.nspname = c.table_schema
            WHERE c.table_schema = 'public'
            ORDER BY c.table_name, c.ordinal_position
            "#,
        )
        .fetch_all(pool)
        .await?;

    let mut tables: Vec<ReflectedTable> = Vec::new();
    for (table_name, column_name, data_type, is_nullable, default, comment) in col_rows {
        let primary_key = pk_columns.contains(&(table_name.clone(), column_name.clone()));
        let column = ReflectedColumn {
            name: column_name,
            data_type,
            nullable: is_nullable == "YES",
            server_default: default,
            comment,
            primary_key,
        };
        match tables.last_mut() {
            Some(t) if t.name == table_name => t.columns.push(column),
            _ => tables.push(ReflectedTable {
                name: table_name,
                columns: vec![column],
            }),
        }
    }

    Ok(DbMetadata { tables })
}

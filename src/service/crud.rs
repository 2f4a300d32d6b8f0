//! Generic CRUD execution against PostgreSQL. Every operation runs inside
//! one session scope: commit on success, rollback on error.

use crate::error::AppError;
use crate::model::{ApiModel, PAGE_SIZE};
use crate::scope::SessionScope;
use crate::sql::{self, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// List rows with optional exact-match filters. `limit` defaults to the
    /// fixed page size and is capped there; `skip` is the offset.
    pub async fn list(
        pool: &PgPool,
        model: &ApiModel,
        filters: &[(String, Value)],
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        let (skip, limit) = page_window(skip, limit);
        let q = sql::select_list(model, filters, limit, skip);
        let mut scope = SessionScope::begin(pool).await?;
        match fetch_all(scope.conn(), &q).await {
            Ok(rows) => {
                scope.commit().await?;
                Ok(rows)
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }

    /// Fetch one row by primary key.
    pub async fn read(
        pool: &PgPool,
        model: &ApiModel,
        id: &Value,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(model, id);
        let mut scope = SessionScope::begin(pool).await?;
        match fetch_optional(scope.conn(), &q).await {
            Ok(row) => {
                scope.commit().await?;
                Ok(row)
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }

    /// Insert one row; the store assigns the audit columns. Returns the
    /// created row.
    pub async fn create(
        pool: &PgPool,
        model: &ApiModel,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(model, body);
        let mut scope = SessionScope::begin(pool).await?;
        match fetch_optional(scope.conn(), &q).await {
            Ok(Some(row)) => {
                scope.commit().await?;
                Ok(row)
            }
            Ok(None) => {
                scope.rollback().await;
                Err(AppError::Db(sqlx::Error::RowNotFound))
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }

    /// Update one row by primary key, guarded by the caller-supplied version.
    /// A stale version is a conflict and leaves the row untouched; a missing
    /// row is not found.
    pub async fn update(
        pool: &PgPool,
        model: &ApiModel,
        id: &Value,
        version: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::update(model, id, version, body);
        let mut scope = SessionScope::begin(pool).await?;
        match fetch_optional(scope.conn(), &q).await {
            Ok(Some(row)) => {
                scope.commit().await?;
                Ok(row)
            }
            Ok(None) => {
                // zero rows hit: tell a stale version apart from a missing row
                let probe = sql::select_by_id(model, id);
                let existing = fetch_optional(scope.conn(), &probe).await;
                scope.rollback().await;
                match existing {
                    Ok(Some(_)) => Err(AppError::Conflict(format!(
                        "stale version {} for {} id {}",
                        version, model.table_name, id
                    ))),
                    Ok(None) => Err(AppError::NotFound(format!("{} id {}", model.table_name, id))),
                    Err(err) => Err(err),
                }
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }

    /// Soft delete one row. Returns the flipped row; an absent or already
    /// deleted row is not found.
    pub async fn delete(
        pool: &PgPool,
        model: &ApiModel,
        id: &Value,
    ) -> Result<Value, AppError> {
        let q = sql::soft_delete(model, id);
        let mut scope = SessionScope::begin(pool).await?;
        match fetch_optional(scope.conn(), &q).await {
            Ok(Some(row)) => {
                scope.commit().await?;
                Ok(row)
            }
            Ok(None) => {
                scope.rollback().await;
                Err(AppError::NotFound(format!("{} id {}", model.table_name, id)))
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }

    /// Soft delete every in-force row. Returns the affected count.
    pub async fn delete_all(pool: &PgPool, model: &ApiModel) -> Result<u64, AppError> {
        let q = sql::soft_delete_all(model);
        let mut scope = SessionScope::begin(pool).await?;
        match execute(scope.conn(), &q).await {
            Ok(n) => {
                scope.commit().await?;
                Ok(n)
            }
            Err(err) => {
                scope.rollback().await;
                Err(err)
            }
        }
    }
}

/// Offset and limit for one page. The limit defaults to the fixed page size
/// and never exceeds it.
fn page_window(skip: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    (skip.unwrap_or(0), limit.unwrap_or(PAGE_SIZE).min(PAGE_SIZE))
}

async fn fetch_all(conn: &mut PgConnection, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

async fn fetch_optional(conn: &mut PgConnection, q: &QueryBuf) -> Result<Option<Value>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    let row = query.fetch_optional(&mut *conn).await?;
    Ok(row.map(|r| row_to_json(&r)))
}

async fn execute(conn: &mut PgConnection, q: &QueryBuf) -> Result<u64, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    let result = query.execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}

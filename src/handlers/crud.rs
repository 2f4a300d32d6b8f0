//! CRUD handlers. Each router carries the model of the one table it serves,
//! so handlers never resolve a path segment at request time.

use crate::error::AppError;
use crate::model::{ApiModel, ColumnModel, PkKind};
use crate::schema::def::ColumnType;
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-router state: the shared app state plus the served table's model.
#[derive(Clone)]
pub struct RouterState {
    pub app: AppState,
    pub model: Arc<ApiModel>,
}

fn parse_id(id_str: &str, kind: PkKind) -> Result<Value, AppError> {
    match kind {
        PkKind::Int => {
            let n: i64 = id_str
                .parse()
                .map_err(|_| AppError::BadRequest("invalid id".into()))?;
            Ok(Value::Number(n.into()))
        }
        PkKind::Uuid => {
            let u = uuid::Uuid::parse_str(id_str)
                .map_err(|_| AppError::BadRequest("invalid uuid".into()))?;
            Ok(Value::String(u.to_string()))
        }
    }
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Coerce a filter query-param string by the column's declared type.
fn query_value_for_column(col: &ColumnModel, s: &str) -> Value {
    match col.ty {
        ColumnType::Serial | ColumnType::Integer | ColumnType::SmallInt => {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
        }
        ColumnType::Double => {
            if let Some(n) = s.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
        }
        ColumnType::Uuid => {
            if let Ok(u) = uuid::Uuid::parse_str(s) {
                return Value::String(u.to_string());
            }
        }
        ColumnType::Varchar(_) | ColumnType::Timestamp => {}
    }
    Value::String(s.to_string())
}

pub async fn list(
    State(rs): State<RouterState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let mut skip: Option<u32> = None;
    let mut limit: Option<u32> = None;
    let mut filters: Vec<(String, Value)> = Vec::new();

    for (k, v) in params {
        match k.as_str() {
            "skip" => skip = v.parse().ok(),
            "limit" => limit = v.parse().ok(),
            _ => {
                if let Some(col) = rs.model.column(&k) {
                    let val = query_value_for_column(col, &v);
                    filters.push((k, val));
                }
            }
        }
    }

    let rows = CrudService::list(&rs.app.pool, &rs.model, &filters, skip, limit).await?;
    Ok(Json(Value::Array(rows)))
}

pub async fn read(
    State(rs): State<RouterState>,
    Path(id_str): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id_str, rs.model.pk_kind)?;
    let row = CrudService::read(&rs.app.pool, &rs.model, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} id {}", rs.model.table_name, id_str)))?;
    Ok(Json(row))
}

pub async fn create(
    State(rs): State<RouterState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate_create(&body, &rs.model)?;
    let row = CrudService::create(&rs.app.pool, &rs.model, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update requires the caller's `version_id`; it feeds the optimistic-lock
/// predicate rather than being written.
pub async fn update(
    State(rs): State<RouterState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id_str, rs.model.pk_kind)?;
    let mut body = body_to_map(body)?;
    let version = body
        .remove("version_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AppError::Validation("version_id is required for update".into()))?;
    RequestValidator::validate_update(&body, &rs.model)?;
    let row = CrudService::update(&rs.app.pool, &rs.model, &id, version, &body).await?;
    Ok(Json(row))
}

pub async fn delete_one(
    State(rs): State<RouterState>,
    Path(id_str): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id_str, rs.model.pk_kind)?;
    let row = CrudService::delete(&rs.app.pool, &rs.model, &id).await?;
    Ok(Json(row))
}

pub async fn delete_all(State(rs): State<RouterState>) -> Result<Json<Value>, AppError> {
    let n = CrudService::delete_all(&rs.app.pool, &rs.model).await?;
    Ok(Json(serde_json::json!({ "deleted": n })))
}

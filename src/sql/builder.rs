//! Builds parameterized SELECT, INSERT, UPDATE and soft-delete statements
//! from an API model. Deletion never renders SQL DELETE: declared tables are
//! only ever soft-deleted by flipping `delete_flag`.

use crate::model::{ApiModel, ColumnModel};
use crate::schema::DeleteFlag;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Quote identifier for PostgreSQL (names come from declarations, not input).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Placeholder for one column, with the column type's cast when it has one.
fn placeholder(col: &ColumnModel, n: usize) -> String {
    match col.ty.bind_cast() {
        Some(cast) => format!("${}::{}", n, cast),
        None => format!("${}", n),
    }
}

fn select_column_list(model: &ApiModel) -> String {
    model
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT list with optional exact-match filters, ORDER BY pk, LIMIT/OFFSET.
/// Filters on undeclared columns are ignored.
pub fn select_list(
    model: &ApiModel,
    filters: &[(String, Value)],
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let col_names: HashSet<&str> = model.columns.iter().map(|c| c.name.as_str()).collect();
    let table = quoted(&model.table_name);

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if !col_names.contains(col.as_str()) {
            continue;
        }
        let n = q.push_param(val.clone());
        let ph = model
            .column(col)
            .map(|c| placeholder(c, n))
            .unwrap_or_else(|| format!("${}", n));
        where_parts.push(format!("{} = {}", quoted(col), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(model),
        table,
        where_clause,
        quoted(&model.pk_column),
        limit,
        offset
    );
    q
}

/// SELECT one row by primary key.
pub fn select_by_id(model: &ApiModel, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(id.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(model),
        quoted(&model.table_name),
        quoted(&model.pk_column)
    );
    q
}

/// INSERT from body. Read-only audit columns are never inserted; columns
/// with a server default are omitted when the body has no value, so the
/// store assigns `version_id = 1`, `delete_flag`, and both timestamps.
pub fn insert(model: &ApiModel, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &model.columns {
        if !c.writable {
            continue;
        }
        let val = body.get(&c.name).cloned();
        if val.is_none() && c.has_server_default {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(&c.name));
        placeholders.push(placeholder(c, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(&model.table_name),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(model)
    );
    q
}

/// UPDATE by primary key with the optimistic-lock predicate. SET covers the
/// writable columns present in the body, plus the version bump and timestamp
/// refresh; zero rows hit means the row is missing or the version is stale.
pub fn update(
    model: &ApiModel,
    id: &Value,
    version: i64,
    body: &HashMap<String, Value>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &model.columns {
        if !c.writable {
            continue;
        }
        let Some(val) = body.get(&c.name) else { continue };
        let n = q.push_param(val.clone());
        sets.push(format!("{} = {}", quoted(&c.name), placeholder(c, n)));
    }
    sets.push(format!("{} = {} + 1", quoted("version_id"), quoted("version_id")));
    sets.push(format!("{} = NOW()", quoted("updated_at")));

    let id_param = q.push_param(id.clone());
    let version_param = q.push_param(Value::Number(version.into()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} AND {} = ${} RETURNING {}",
        quoted(&model.table_name),
        sets.join(", "),
        quoted(&model.pk_column),
        id_param,
        quoted("version_id"),
        version_param,
        select_column_list(model)
    );
    q
}

/// Soft delete one row: flip `delete_flag`, bump the version, refresh the
/// timestamp. Matches only rows currently in force, so deleting an already
/// deleted row hits zero rows.
pub fn soft_delete(model: &ApiModel, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} = {}, {} = {} + 1, {} = NOW() WHERE {} = $1 AND {} = {} RETURNING {}",
        quoted(&model.table_name),
        quoted("delete_flag"),
        DeleteFlag::Deleted as i16,
        quoted("version_id"),
        quoted("version_id"),
        quoted("updated_at"),
        quoted(&model.pk_column),
        quoted("delete_flag"),
        DeleteFlag::InForce as i16,
        select_column_list(model)
    );
    q
}

/// Soft delete every in-force row. Executed for its affected count.
pub fn soft_delete_all(model: &ApiModel) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "UPDATE {} SET {} = {}, {} = {} + 1, {} = NOW() WHERE {} = {}",
        quoted(&model.table_name),
        quoted("delete_flag"),
        DeleteFlag::Deleted as i16,
        quoted("version_id"),
        quoted("version_id"),
        quoted("updated_at"),
        quoted("delete_flag"),
        DeleteFlag::InForce as i16,
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::derive_model;
    use crate::schema::action_event;
    use serde_json::json;

    fn event_model() -> ApiModel {
        derive_model(&action_event()).unwrap()
    }

    #[test]
    fn select_list_renders_pagination_and_filters() {
        let model = event_model();
        let filters = vec![
            ("user_id".to_string(), json!(7)),
            ("not_a_column".to_string(), json!("x")),
        ];
        let q = select_list(&model, &filters, 20, 40);
        assert!(q.sql.starts_with("SELECT \"id\", \"version_id\", \"delete_flag\""));
        assert!(q.sql.contains("FROM \"action_event\" WHERE \"user_id\" = $1::int4"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 20 OFFSET 40"));
        // the unknown column contributed no parameter
        assert_eq!(q.params, vec![json!(7)]);
    }

    #[test]
    fn insert_omits_server_managed_columns() {
        let model = event_model();
        let body: HashMap<String, Value> = [
            ("user_id".to_string(), json!(3)),
            ("user_type".to_string(), json!("teacher")),
            ("primary_data_id".to_string(), json!(11)),
        ]
        .into();
        let q = insert(&model, &body);
        for absent in ["\"id\"", "\"version_id\"", "\"delete_flag\"", "\"created_at\"", "\"updated_at\"", "\"action_event_type\""] {
            let insert_cols = q.sql.split("VALUES").next().unwrap();
            assert!(
                !insert_cols.contains(absent),
                "{} should be left to the server: {}",
                absent,
                q.sql
            );
        }
        assert!(q.sql.contains("\"user_id\""));
        assert!(q.sql.contains("RETURNING"));
        // nullable no-default columns bind NULL explicitly
        assert!(q.params.contains(&Value::Null));
    }

    #[test]
    fn insert_keeps_provided_defaultable_column() {
        let model = event_model();
        let body: HashMap<String, Value> = [
            ("user_id".to_string(), json!(3)),
            ("user_type".to_string(), json!("teacher")),
            ("primary_data_id".to_string(), json!(11)),
            ("action_event_type".to_string(), json!(2)),
        ]
        .into();
        let q = insert(&model, &body);
        assert!(q.sql.contains("\"action_event_type\""));
        assert!(q.params.contains(&json!(2)));
    }

    #[test]
    fn update_carries_lock_predicate_and_bumps() {
        let model = event_model();
        let body: HashMap<String, Value> = [("remark".to_string(), json!("checked"))].into();
        let q = update(&model, &json!(5), 3, &body);
        assert!(q.sql.contains("\"version_id\" = \"version_id\" + 1"));
        assert!(q.sql.contains("\"updated_at\" = NOW()"));
        assert!(q.sql.contains("WHERE \"id\" = $2 AND \"version_id\" = $3"));
        assert!(q.sql.contains("RETURNING"));
        assert_eq!(q.params, vec![json!("checked"), json!(5), json!(3)]);
    }

    #[test]
    fn update_ignores_read_only_columns_in_body() {
        let model = event_model();
        let body: HashMap<String, Value> = [
            ("remark".to_string(), json!("x")),
            ("created_at".to_string(), json!("2024-01-01T00:00:00")),
            ("delete_flag".to_string(), json!(2)),
        ]
        .into();
        let q = update(&model, &json!(1), 1, &body);
        let set_clause = q.sql.split("WHERE").next().unwrap();
        assert!(!set_clause.contains("\"created_at\" = $"));
        assert!(!set_clause.contains("\"delete_flag\" = $"));
        assert!(set_clause.contains("\"remark\" = $1"));
    }

    #[test]
    fn soft_delete_is_an_update_on_in_force_rows() {
        let model = event_model();
        let q = soft_delete(&model, &json!(9));
        assert!(q.sql.starts_with("UPDATE \"action_event\" SET \"delete_flag\" = 2"));
        assert!(q.sql.contains("\"version_id\" = \"version_id\" + 1"));
        assert!(q.sql.contains("WHERE \"id\" = $1 AND \"delete_flag\" = 1"));
        assert!(q.sql.contains("RETURNING"));
        assert!(!q.sql.contains("DELETE FROM"));
    }

    #[test]
    fn soft_delete_all_touches_only_in_force_rows() {
        let model = event_model();
        let q = soft_delete_all(&model);
        assert!(q.sql.contains("WHERE \"delete_flag\" = 1"));
        assert!(q.params.is_empty());
        assert!(!q.sql.contains("DELETE FROM"));
    }
}

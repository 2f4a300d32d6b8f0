//! Runtime API model derived from table declarations: what the generic CRUD
//! router needs to parse ids, build SQL, and validate bodies. Derivation
//! failures are fatal at startup.

use crate::error::SchemaError;
use crate::schema::def::{ColumnType, TableDef};
use std::collections::HashSet;

/// Fixed page size for list endpoints.
pub const PAGE_SIZE: u32 = 20;

/// Primary key kind, for parsing path ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkKind {
    Int,
    Uuid,
}

#[derive(Clone, Debug)]
pub struct ColumnModel {
    pub name: String,
    pub ty: ColumnType,
    pub is_pk: bool,
    pub nullable: bool,
    pub has_server_default: bool,
    /// Whether clients may supply this column in create/update bodies.
    /// Server-managed audit columns are read-only; `updated_by` is not.
    pub writable: bool,
    pub allowed_values: Option<Vec<i16>>,
}

impl ColumnModel {
    /// Required on create: must be supplied because neither the client
    /// nor the server has a default for it.
    pub fn required_on_create(&self) -> bool {
        self.writable && !self.nullable && !self.has_server_default
    }
}

#[derive(Clone, Debug)]
pub struct ApiModel {
    pub table_name: String,
    /// URL path segment the router mounts under; derived from the table name.
    pub path_segment: String,
    pub pk_column: String,
    pub pk_kind: PkKind,
    pub columns: Vec<ColumnModel>,
}

impl ApiModel {
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Audit columns the store manages; clients never write these directly.
/// `version_id` still appears in update bodies, but only as the value checked
/// by the optimistic-lock predicate.
const READ_ONLY_COLUMNS: &[&str] = &["version_id", "delete_flag", "created_at", "updated_at"];

/// Derive the runtime model for one declared table.
pub fn derive_model(table: &TableDef) -> Result<ApiModel, SchemaError> {
    let mut seen = HashSet::new();
    for col in &table.columns {
        if !seen.insert(col.name.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                table: table.name.clone(),
                column: col.name.clone(),
            });
        }
    }

    let mut pks = table.columns.iter().filter(|c| c.primary_key);
    let pk = pks.next().ok_or_else(|| SchemaError::MissingPrimaryKey {
        table: table.name.clone(),
    })?;
    if pks.next().is_some() {
        return Err(SchemaError::MultiplePrimaryKeys {
            table: table.name.clone(),
        });
    }
    let pk_kind = match pk.ty {
        ColumnType::Serial | ColumnType::Integer => PkKind::Int,
        ColumnType::Uuid => PkKind::Uuid,
        _ => {
            return Err(SchemaError::UnsupportedPrimaryKey {
                table: table.name.clone(),
                column: pk.name.clone(),
            })
        }
    };

    let columns = table
        .columns
        .iter()
        .map(|c| ColumnModel {
            name: c.name.clone(),
            ty: c.ty,
            is_pk: c.primary_key,
            nullable: c.nullable,
            has_server_default: c.server_default.is_some() || c.ty == ColumnType::Serial,
            writable: !c.primary_key && !READ_ONLY_COLUMNS.contains(&c.name.as_str()),
            allowed_values: c.allowed_values.clone(),
        })
        .collect();

    Ok(ApiModel {
        table_name: table.name.clone(),
        path_segment: table.name.clone(),
        pk_column: pk.name.clone(),
        pk_kind,
        columns,
    })
}

/// Derive models for every declared table. Each table must resolve and path
/// segments must be unique; any failure aborts startup.
pub fn derive_all(tables: &[TableDef]) -> Result<Vec<ApiModel>, SchemaError> {
    let mut models = Vec::with_capacity(tables.len());
    let mut paths = HashSet::new();
    for table in tables {
        let model = derive_model(table)?;
        if !paths.insert(model.path_segment.clone()) {
            return Err(SchemaError::DuplicatePathSegment(model.path_segment));
        }
        models.push(model);
    }
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::def::{ColumnDef, ServerDefault};
    use crate::schema::registry;

    #[test]
    fn derives_every_registry_table() {
        let models = derive_all(&registry()).unwrap();
        let paths: Vec<&str> = models.iter().map(|m| m.path_segment.as_str()).collect();
        assert_eq!(paths, vec!["system_user", "action_event"]);
        for m in &models {
            assert_eq!(m.pk_column, "id");
            assert_eq!(m.pk_kind, PkKind::Int);
        }
    }

    #[test]
    fn audit_columns_are_read_only() {
        let models = derive_all(&registry()).unwrap();
        let user = &models[0];
        for name in ["id", "version_id", "delete_flag", "created_at", "updated_at"] {
            assert!(!user.column(name).unwrap().writable, "{} must be read-only", name);
        }
        assert!(user.column("updated_by").unwrap().writable);
        assert!(user.column("username").unwrap().writable);
    }

    #[test]
    fn required_on_create_matches_declarations() {
        let models = derive_all(&registry()).unwrap();
        let user = &models[0];
        assert!(user.column("username").unwrap().required_on_create());
        assert!(user.column("password").unwrap().required_on_create());
        assert!(!user.column("email").unwrap().required_on_create());
        // server default covers it
        assert!(!user.column("version_id").unwrap().required_on_create());

        let event = &models[1];
        assert!(event.column("user_id").unwrap().required_on_create());
        assert!(!event.column("action_event_type").unwrap().required_on_create());
    }

    #[test]
    fn missing_primary_key_is_fatal() {
        let table = TableDef::new("no_pk").column(ColumnDef::new("name", ColumnType::Varchar(10)));
        assert!(matches!(
            derive_model(&table),
            Err(SchemaError::MissingPrimaryKey { .. })
        ));
    }

    #[test]
    fn duplicate_column_is_fatal() {
        let table = TableDef::new("dup")
            .column(ColumnDef::new("id", ColumnType::Serial).primary_key())
            .column(ColumnDef::new("name", ColumnType::Varchar(10)))
            .column(ColumnDef::new("name", ColumnType::Varchar(10)));
        assert!(matches!(
            derive_model(&table),
            Err(SchemaError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn duplicate_path_segment_is_fatal() {
        let t = TableDef::new("twice").column(ColumnDef::new("id", ColumnType::Serial).primary_key());
        assert!(matches!(
            derive_all(&[t.clone(), t]),
            Err(SchemaError::DuplicatePathSegment(_))
        ));
    }

    #[test]
    fn unsupported_primary_key_type_is_fatal() {
        let table = TableDef::new("bad_pk")
            .column(ColumnDef::new("id", ColumnType::Varchar(20)).primary_key());
        assert!(matches!(
            derive_model(&table),
            Err(SchemaError::UnsupportedPrimaryKey { .. })
        ));
    }

    #[test]
    fn server_default_detected_for_serial_and_declared_defaults() {
        let table = TableDef::new("t")
            .column(ColumnDef::new("id", ColumnType::Serial).primary_key())
            .column(
                ColumnDef::new("state", ColumnType::SmallInt)
                    .not_null()
                    .server_default(ServerDefault::Int(1)),
            )
            .column(ColumnDef::new("name", ColumnType::Varchar(10)).not_null());
        let model = derive_model(&table).unwrap();
        assert!(model.column("id").unwrap().has_server_default);
        assert!(model.column("state").unwrap().has_server_default);
        assert!(!model.column("name").unwrap().has_server_default);
    }
}

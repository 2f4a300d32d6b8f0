//! Declaration types for tables and columns. Declarations are plain data;
//! everything downstream (API model, SQL, DDL) is derived from them.

use serde::Serialize;

/// Column type. Carries enough for DDL rendering and for the SQL cast used
/// when binding JSON values (timestamps and uuids arrive as strings).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Auto-incrementing integer, for primary keys.
    Serial,
    Integer,
    SmallInt,
    Double,
    Varchar(u16),
    Timestamp,
    Uuid,
}

impl ColumnType {
    /// Type name as it appears in CREATE TABLE.
    pub fn sql_name(&self) -> String {
        match self {
            ColumnType::Serial => "SERIAL".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::SmallInt => "SMALLINT".into(),
            ColumnType::Double => "DOUBLE PRECISION".into(),
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::Timestamp => "TIMESTAMP".into(),
            ColumnType::Uuid => "UUID".into(),
        }
    }

    /// Cast applied to bind placeholders (`$n::type`) so JSON-sourced values
    /// land in the column's type. None means the bound value needs no cast.
    pub fn bind_cast(&self) -> Option<&'static str> {
        match self {
            ColumnType::Serial | ColumnType::Integer => Some("int4"),
            ColumnType::SmallInt => Some("smallint"),
            ColumnType::Double => Some("float8"),
            ColumnType::Varchar(_) => None,
            ColumnType::Timestamp => Some("timestamp"),
            ColumnType::Uuid => Some("uuid"),
        }
    }

    pub fn max_length(&self) -> Option<u16> {
        match self {
            ColumnType::Varchar(n) => Some(*n),
            _ => None,
        }
    }
}

/// Server-side default rendered into DDL. Columns with a server default are
/// omitted from INSERT when the body does not provide a value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ServerDefault {
    Int(i64),
    CurrentTimestamp,
}

impl ServerDefault {
    pub fn sql(&self) -> String {
        match self {
            ServerDefault::Int(n) => n.to_string(),
            ServerDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub indexed: bool,
    pub server_default: Option<ServerDefault>,
    pub comment: Option<String>,
    /// Allowed integer values for enum-backed columns (wire representation).
    pub allowed_values: Option<Vec<i16>>,
}

impl ColumnDef {
    pub fn new(name: &str, ty: ColumnType) -> Self {
        ColumnDef {
            name: name.to_string(),
            ty,
            nullable: true,
            primary_key: false,
            unique: false,
            indexed: false,
            server_default: None,
            comment: None,
            allowed_values: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn server_default(mut self, d: ServerDefault) -> Self {
        self.server_default = Some(d);
        self
    }

    pub fn comment(mut self, c: &str) -> Self {
        self.comment = Some(c.to_string());
        self
    }

    pub fn allowed_values(mut self, values: Vec<i16>) -> Self {
        self.allowed_values = Some(values);
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TableDef {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        TableDef {
            name: name.to_string(),
            comment: None,
            columns: Vec::new(),
        }
    }

    pub fn comment(mut self, c: &str) -> Self {
        self.comment = Some(c.to_string());
        self
    }

    /// Append a shared column set (e.g. the audit columns).
    pub fn columns(mut self, cols: Vec<ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varchar_renders_length() {
        assert_eq!(ColumnType::Varchar(60).sql_name(), "VARCHAR(60)");
        assert_eq!(ColumnType::Varchar(60).max_length(), Some(60));
        assert_eq!(ColumnType::Integer.max_length(), None);
    }

    #[test]
    fn builder_defaults() {
        let col = ColumnDef::new("username", ColumnType::Varchar(60));
        assert!(col.nullable);
        assert!(!col.primary_key);
        assert!(col.server_default.is_none());

        let col = col.not_null().unique().comment("user provided unique name");
        assert!(!col.nullable);
        assert!(col.unique);
        assert_eq!(col.comment.as_deref(), Some("user provided unique name"));
    }

    #[test]
    fn primary_key_implies_not_null() {
        let col = ColumnDef::new("id", ColumnType::Serial).primary_key();
        assert!(col.primary_key);
        assert!(!col.nullable);
    }
}

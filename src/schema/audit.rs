//! Audit columns shared by every declared table, and the soft-delete flag.

use crate::schema::def::{ColumnDef, ColumnType, ServerDefault};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Soft-delete state. The wire representation is the integer discriminant
/// (enum values start at 1, matching the stored SMALLINT).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i16)]
pub enum DeleteFlag {
    InForce = 1,
    Deleted = 2,
}

impl DeleteFlag {
    pub fn values() -> Vec<i16> {
        vec![DeleteFlag::InForce as i16, DeleteFlag::Deleted as i16]
    }
}

impl TryFrom<i16> for DeleteFlag {
    type Error = i16;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(DeleteFlag::InForce),
            2 => Ok(DeleteFlag::Deleted),
            other => Err(other),
        }
    }
}

impl Serialize for DeleteFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(*self as i16)
    }
}

impl<'de> Deserialize<'de> for DeleteFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = i16::deserialize(deserializer)?;
        DeleteFlag::try_from(v).map_err(|v| D::Error::custom(format!("invalid delete_flag: {}", v)))
    }
}

/// The shared audit column set, appended to each table's own columns.
/// `id` is the primary key; `version_id` backs the optimistic lock;
/// `delete_flag` carries the soft-delete state; timestamps are server-assigned.
pub fn audit_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", ColumnType::Serial).primary_key(),
        ColumnDef::new("version_id", ColumnType::Integer)
            .not_null()
            .server_default(ServerDefault::Int(1))
            .comment("optimistic lock counter"),
        ColumnDef::new("delete_flag", ColumnType::SmallInt)
            .not_null()
            .server_default(ServerDefault::Int(DeleteFlag::InForce as i64))
            .allowed_values(DeleteFlag::values())
            .comment("soft delete state"),
        ColumnDef::new("created_at", ColumnType::Timestamp)
            .not_null()
            .server_default(ServerDefault::CurrentTimestamp)
            .comment("created time"),
        ColumnDef::new("updated_at", ColumnType::Timestamp)
            .not_null()
            .server_default(ServerDefault::CurrentTimestamp)
            .indexed()
            .comment("last updated time"),
        ColumnDef::new("updated_by", ColumnType::Varchar(60))
            .indexed()
            .comment("last updated operator name"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_flag_wire_values() {
        assert_eq!(DeleteFlag::InForce as i16, 1);
        assert_eq!(DeleteFlag::Deleted as i16, 2);
        assert_eq!(DeleteFlag::values(), vec![1, 2]);
    }

    #[test]
    fn delete_flag_from_integer() {
        assert_eq!(DeleteFlag::try_from(1), Ok(DeleteFlag::InForce));
        assert_eq!(DeleteFlag::try_from(2), Ok(DeleteFlag::Deleted));
        assert_eq!(DeleteFlag::try_from(0), Err(0));
        assert_eq!(DeleteFlag::try_from(3), Err(3));
    }

    #[test]
    fn delete_flag_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&DeleteFlag::InForce).unwrap(), "1");
        let flag: DeleteFlag = serde_json::from_str("2").unwrap();
        assert_eq!(flag, DeleteFlag::Deleted);
        assert!(serde_json::from_str::<DeleteFlag>("0").is_err());
    }

    #[test]
    fn audit_set_shape() {
        let cols = audit_columns();
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "version_id", "delete_flag", "created_at", "updated_at", "updated_by"]
        );
        let version = &cols[1];
        assert_eq!(version.server_default, Some(ServerDefault::Int(1)));
        assert!(!version.nullable);
        let flag = &cols[2];
        assert_eq!(flag.server_default, Some(ServerDefault::Int(1)));
        assert_eq!(flag.allowed_values.as_deref(), Some(&[1_i16, 2][..]));
        // only updated_by may be written by clients; it is the sole nullable one
        assert!(cols[5].nullable);
    }
}

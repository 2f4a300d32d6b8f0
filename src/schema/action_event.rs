//! The `action_event` table: actor-initiated events with before/after state
//! snapshots and a reference to the primary record they concern.

use crate::schema::audit::audit_columns;
use crate::schema::def::{ColumnDef, ColumnType, ServerDefault, TableDef};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Event kind, integer on the wire (values start at 1, matching the stored
/// SMALLINT).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i16)]
pub enum ActionEventType {
    Unknown = 1,
    TeacherCheck = 2,
    TeacherTalk = 3,
    StudentTalk = 4,
}

impl ActionEventType {
    pub fn values() -> Vec<i16> {
        vec![
            ActionEventType::Unknown as i16,
            ActionEventType::TeacherCheck as i16,
            ActionEventType::TeacherTalk as i16,
            ActionEventType::StudentTalk as i16,
        ]
    }
}

impl TryFrom<i16> for ActionEventType {
    type Error = i16;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(ActionEventType::Unknown),
            2 => Ok(ActionEventType::TeacherCheck),
            3 => Ok(ActionEventType::TeacherTalk),
            4 => Ok(ActionEventType::StudentTalk),
            other => Err(other),
        }
    }
}

impl Serialize for ActionEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(*self as i16)
    }
}

impl<'de> Deserialize<'de> for ActionEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = i16::deserialize(deserializer)?;
        ActionEventType::try_from(v)
            .map_err(|v| D::Error::custom(format!("invalid action_event_type: {}", v)))
    }
}

pub fn action_event() -> TableDef {
    TableDef::new("action_event")
        .comment("actor-initiated event log")
        .columns(audit_columns())
        .column(
            ColumnDef::new("user_id", ColumnType::Integer)
                .not_null()
                .comment("acting user id"),
        )
        .column(
            ColumnDef::new("user_type", ColumnType::Varchar(150))
                .not_null()
                .comment("acting user type"),
        )
        .column(
            ColumnDef::new("action_event_type", ColumnType::SmallInt)
                .not_null()
                .server_default(ServerDefault::Int(ActionEventType::Unknown as i64))
                .allowed_values(ActionEventType::values())
                .comment("event kind"),
        )
        .column(
            ColumnDef::new("action_event_desc", ColumnType::Varchar(2000))
                .comment("event description"),
        )
        .column(
            ColumnDef::new("action_event_domain", ColumnType::Varchar(50))
                .comment("business domain the event belongs to"),
        )
        .column(
            ColumnDef::new("before_state", ColumnType::Varchar(120))
                .comment("state before the event"),
        )
        .column(
            ColumnDef::new("after_state", ColumnType::Varchar(120))
                .comment("state after the event"),
        )
        .column(
            ColumnDef::new("primary_table_name", ColumnType::Varchar(120))
                .comment("name of the primary table the event concerns"),
        )
        .column(
            ColumnDef::new("primary_data_id", ColumnType::Integer)
                .not_null()
                .comment("primary key of the record the event concerns"),
        )
        .column(ColumnDef::new("remark", ColumnType::Varchar(1000)).comment("remark text"))
}

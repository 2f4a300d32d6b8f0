//! Declarative table definitions and the registry of declared tables.

pub mod action_event;
pub mod audit;
pub mod def;
pub mod user;

pub use action_event::{action_event, ActionEventType};
pub use audit::{audit_columns, DeleteFlag};
pub use def::{ColumnDef, ColumnType, ServerDefault, TableDef};
pub use user::system_user;

/// Every declared table, in mount order. Routers, migrations, and validation
/// all derive from this list; adding a table here is the whole registration.
pub fn registry() -> Vec<TableDef> {
    vec![system_user(), action_event()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_declared_table() {
        let names: Vec<String> = registry().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["system_user", "action_event"]);
    }

    #[test]
    fn every_table_carries_the_audit_set() {
        for table in registry() {
            for col in ["id", "version_id", "delete_flag", "created_at", "updated_at", "updated_by"] {
                assert!(
                    table.column_by_name(col).is_some(),
                    "{} is missing audit column {}",
                    table.name,
                    col
                );
            }
        }
    }
}

//! Upstream records. Kept as opaque JSON objects; only the handful of fields
//! the adapter navigates by are read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One upstream JSON object (project, scheme, task or menu item).
pub type Record = Map<String, Value>;

/// Menu items of this master type are task types.
pub const TASK_MASTER_TYPE_ID: i64 = 4;

/// Upstream project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        ProjectId(id)
    }
}

/// Decode a JSON array of objects.
pub(crate) fn parse_records(body: &[u8], what: &str) -> Result<Vec<Record>> {
    serde_json::from_slice(body).with_context(|| format!("malformed {what} response"))
}

/// Integer field `name`: `Ok(None)` when absent, error when present but not an integer.
pub(crate) fn int_field(record: &Record, name: &str) -> Result<Option<i64>> {
    match record.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .with_context(|| format!("field {name} is not an integer: {value}")),
    }
}

/// Collect the `Id` of every record that has one, in order.
pub(crate) fn collect_ids(records: &[Record]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(records.len());
    for record in records {
        if let Some(id) = int_field(record, "Id")? {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub(crate) fn is_task_menu_item(record: &Record) -> bool {
    record.get("MasterTypeId").and_then(Value::as_i64) == Some(TASK_MASTER_TYPE_ID)
}

pub(crate) fn belongs_to_project(record: &Record, project_id: ProjectId) -> bool {
    record.get("ProjectId").and_then(Value::as_i64) == Some(project_id.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn collect_ids_skips_records_without_id() {
        let records = vec![
            record(json!({"Id": 3})),
            record(json!({"Name": "no id"})),
            record(json!({"Id": 1})),
        ];
        assert_eq!(collect_ids(&records).unwrap(), vec![3, 1]);
    }

    #[test]
    fn collect_ids_rejects_non_integer_id() {
        let records = vec![record(json!({"Id": "abc"}))];
        assert!(collect_ids(&records).is_err());
    }

    #[test]
    fn task_menu_item_matches_master_type_4_only() {
        assert!(is_task_menu_item(&record(json!({"Id": 1, "MasterTypeId": 4}))));
        assert!(!is_task_menu_item(&record(json!({"Id": 2, "MasterTypeId": 3}))));
        assert!(!is_task_menu_item(&record(json!({"Id": 3, "MasterTypeId": "4"}))));
        assert!(!is_task_menu_item(&record(json!({"Id": 4}))));
    }

    #[test]
    fn project_membership() {
        let task = record(json!({"Id": 10, "ProjectId": 5}));
        assert!(belongs_to_project(&task, ProjectId(5)));
        assert!(!belongs_to_project(&task, ProjectId(6)));
        assert!(!belongs_to_project(&record(json!({"Id": 11})), ProjectId(5)));
    }

    #[test]
    fn parse_records_rejects_non_array() {
        assert!(parse_records(br#"{"Id": 1}"#, "project list").is_err());
        assert_eq!(parse_records(b"[]", "project list").unwrap().len(), 0);
    }

    #[test]
    fn project_id_display_and_json() {
        let id = ProjectId(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}

use serde_json::{Map, Value};
use statedb_engine::Change;
use statedb_model::Schema;

/// Encode a committed change set into a transaction delta record.
///
/// Returns `None` if the result would have no table entries at all, per the
/// "commit is a no-op on disk" rule -- the caller should then skip the
/// `write` entirely.
pub fn encode(changes: &[Change], schema: &Schema, comment: Option<&str>, now_millis: i64) -> Option<Value> {
    let mut tables: Map<String, Value> = Map::new();

    for change in changes {
        let Some(row_json) = row_json(change, schema) else { continue };
        let entry = tables.entry(change.table().to_string()).or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(rows) = entry else { unreachable!() };
        rows.insert(change.uuid().to_string(), row_json);
    }

    tables.retain(|_, v| matches!(v, Value::Object(rows) if !rows.is_empty()));
    if tables.is_empty() {
        return None;
    }

    let mut top = Map::new();
    for (table, rows) in tables {
        top.insert(table, rows);
    }
    top.insert("_date".into(), Value::Number(now_millis.into()));
    if let Some(comment) = comment {
        top.insert("_comment".into(), Value::String(comment.to_string()));
    }
    Some(Value::Object(top))
}

/// The JSON value for one row's change, or `None` if it carries nothing
/// worth persisting (an empty modify).
fn row_json(change: &Change, schema: &Schema) -> Option<Value> {
    match change {
        Change::Delete { .. } => Some(Value::Null),
        Change::Insert { table, fields, .. } => {
            let table_schema = schema.table(table).expect("change refers to a table in the schema");
            let mut obj = Map::new();
            for (column, value) in table_schema.columns.iter().zip(fields) {
                if !column.persistent || value.is_default() {
                    continue;
                }
                obj.insert(column.name.clone(), value.to_json());
            }
            Some(Value::Object(obj))
        }
        Change::Modify { table, fields, changed, .. } => {
            let table_schema = schema.table(table).expect("change refers to a table in the schema");
            let mut obj = Map::new();
            for ((column, value), is_changed) in table_schema.columns.iter().zip(fields).zip(changed) {
                if !column.persistent || !is_changed {
                    continue;
                }
                obj.insert(column.name.clone(), value.to_json());
            }
            if obj.is_empty() {
                None
            } else {
                Some(Value::Object(obj))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statedb_model::{ColumnSchema, ColumnType, TableSchema};
    use uuid::Uuid;

    fn schema() -> Schema {
        Schema {
            name: "t".into(),
            version: String::new(),
            checksum: String::new(),
            tables: vec![TableSchema {
                name: "T".into(),
                columns: vec![
                    ColumnSchema {
                        index: 0,
                        name: "k".into(),
                        persistent: true,
                        column_type: ColumnType::String,
                    },
                    ColumnSchema {
                        index: 1,
                        name: "v".into(),
                        persistent: true,
                        column_type: ColumnType::Integer,
                    },
                ],
            }],
        }
    }

    #[test]
    fn insert_emits_non_default_columns_only() {
        let schema = schema();
        let uuid = Uuid::new_v4();
        let changes = vec![Change::Insert {
            table: "T".into(),
            uuid,
            fields: vec![statedb_model::Datum::Str("a".into()), statedb_model::Datum::Int(0)],
        }];
        let delta = encode(&changes, &schema, None, 1000).unwrap();
        let row = &delta["T"][uuid.to_string()];
        assert_eq!(row, &json!({"k": "a"}));
        assert_eq!(delta["_date"], json!(1000));
    }

    #[test]
    fn empty_modify_is_omitted_and_empty_changeset_yields_none() {
        let schema = schema();
        let uuid = Uuid::new_v4();
        let changes = vec![Change::Modify {
            table: "T".into(),
            uuid,
            fields: vec![statedb_model::Datum::Str("a".into()), statedb_model::Datum::Int(1)],
            changed: vec![false, false],
        }];
        assert!(encode(&changes, &schema, None, 0).is_none());
    }

    #[test]
    fn delete_emits_null() {
        let schema = schema();
        let uuid = Uuid::new_v4();
        let changes = vec![Change::Delete { table: "T".into(), uuid }];
        let delta = encode(&changes, &schema, Some("compact"), 5).unwrap();
        assert_eq!(delta["T"][uuid.to_string()], Value::Null);
        assert_eq!(delta["_comment"], json!("compact"));
    }
}

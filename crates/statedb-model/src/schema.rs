use serde_json::{Map, Value};

use crate::column::{ColumnSchema, ColumnType};
use crate::error::{Error, Result};

/// The columns of one table, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn from_json(name: &str, json: &Value) -> Result<Self> {
        let obj = json.as_object().ok_or_else(|| Error::MissingTableField {
            table: name.to_string(),
            field: "columns",
        })?;
        let columns_json = obj
            .get("columns")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::MissingTableField {
                table: name.to_string(),
                field: "columns",
            })?;

        let mut columns = Vec::with_capacity(columns_json.len());
        for (index, (col_name, col_json)) in columns_json.iter().enumerate() {
            let col_obj = col_json.as_object();
            let type_str = col_obj
                .and_then(|o| o.get("type"))
                .and_then(Value::as_str)
                .ok_or_else(|| Error::MissingColumnField {
                    table: name.to_string(),
                    column: col_name.clone(),
                    field: "type",
                })?;
            let persistent = col_obj
                .and_then(|o| o.get("persistent"))
                .and_then(Value::as_bool)
                .unwrap_or(true);
            columns.push(ColumnSchema {
                index,
                name: col_name.clone(),
                persistent,
                column_type: ColumnType::from_str(type_str)?,
            });
        }

        Ok(TableSchema {
            name: name.to_string(),
            columns,
        })
    }

    fn to_json(&self) -> Value {
        let mut columns = Map::new();
        for column in &self.columns {
            let mut col_obj = Map::new();
            col_obj.insert("type".into(), Value::String(column.column_type.as_str().into()));
            if !column.persistent {
                col_obj.insert("persistent".into(), Value::Bool(false));
            }
            columns.insert(column.name.clone(), Value::Object(col_obj));
        }
        let mut obj = Map::new();
        obj.insert("columns".into(), Value::Object(columns));
        Value::Object(obj)
    }
}

/// A database schema: a name, a version, a checksum, and a table map.
///
/// Mirrors `schema_from_json`/`schema_to_json`/`schema_clone`/`schema_equal`
/// from the consumed-interface list: this type derives `Clone` and
/// `PartialEq` so those map directly onto `.clone()` and `==`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub version: String,
    pub checksum: String,
    pub tables: Vec<TableSchema>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Parse a schema record's JSON payload.
    pub fn from_json(json: &Value) -> Result<Self> {
        let obj = json.as_object().ok_or(Error::NotAnObject)?;
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("name"))?
            .to_string();
        let version = obj.get("version").and_then(Value::as_str).unwrap_or_default().to_string();
        let checksum = obj.get("checksum").and_then(Value::as_str).unwrap_or_default().to_string();
        let tables_json = obj.get("tables").and_then(Value::as_object).ok_or(Error::MissingField("tables"))?;

        let mut tables = Vec::with_capacity(tables_json.len());
        for (table_name, table_json) in tables_json.iter() {
            tables.push(TableSchema::from_json(table_name, table_json)?);
        }

        Ok(Schema {
            name,
            version,
            checksum,
            tables,
        })
    }

    /// Render this schema back to its JSON record shape.
    pub fn to_json(&self) -> Value {
        let mut tables = Map::new();
        for table in &self.tables {
            tables.insert(table.name.clone(), table.to_json());
        }
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.clone()));
        obj.insert("version".into(), Value::String(self.version.clone()));
        obj.insert("checksum".into(), Value::String(self.checksum.clone()));
        obj.insert("tables".into(), Value::Object(tables));
        Value::Object(obj)
    }
}

/// `schema_equal` as a free function, for callers that prefer it to `==`.
pub fn schema_equal(a: &Schema, b: &Schema) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_through_json() {
        let json = json!({
            "name": "mini",
            "version": "1",
            "checksum": "abc",
            "tables": {
                "T": {
                    "columns": {
                        "k": {"type": "string"},
                        "v": {"type": "integer"},
                    }
                }
            }
        });
        let schema = Schema::from_json(&json).unwrap();
        assert_eq!(schema.name, "mini");
        let table = schema.table("T").unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "k");
        assert_eq!(table.columns[0].index, 0);
        assert_eq!(table.columns[1].name, "v");
        assert_eq!(table.columns[1].column_type, ColumnType::Integer);

        let back = schema.to_json();
        let reparsed = Schema::from_json(&back).unwrap();
        assert_eq!(reparsed, schema);
    }

    #[test]
    fn missing_name_is_an_error() {
        let json = json!({"tables": {}});
        assert!(Schema::from_json(&json).is_err());
    }

    #[test]
    fn non_persistent_column_round_trips() {
        let json = json!({
            "name": "mini",
            "tables": {"T": {"columns": {"k": {"type": "string", "persistent": false}}}}
        });
        let schema = Schema::from_json(&json).unwrap();
        assert!(!schema.table("T").unwrap().columns[0].persistent);
    }
}

use serde_json::Value;
use statedb_engine::{Database, Transaction};
use statedb_model::Datum;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Decode a transaction delta's JSON payload into a [`Transaction`] against
/// `db`'s current schema and contents.
///
/// `converting` silently skips unknown tables and columns instead of
/// erroring, for cross-schema upgrades. Every parsing error aborts
/// immediately: the caller never receives a transaction built from a
/// partially-parsed delta.
pub fn decode(json: &Value, db: &Database, converting: bool) -> Result<Transaction> {
    let obj = json.as_object().ok_or(Error::NotAnObject)?;
    let mut txn = Transaction::create();

    if let Some(comment) = obj.get("_comment").and_then(Value::as_str) {
        txn.set_comment(comment);
    }

    for (key, value) in obj {
        if key == "_date" || key == "_comment" {
            continue;
        }

        let table = match db.table(key) {
            Some(table) => table,
            None if converting => continue,
            None => return Err(Error::UnknownTable(key.clone())),
        };

        let rows = value.as_object().ok_or_else(|| Error::InvalidRowValue {
            table: key.clone(),
            uuid: String::new(),
        })?;

        for (uuid_str, row_value) in rows {
            let uuid = Uuid::parse_str(uuid_str).map_err(|_| Error::InvalidUuid(uuid_str.clone()))?;

            match row_value {
                Value::Null => txn.row_delete(key.clone(), uuid),
                Value::Object(fields) => {
                    let mut parsed = Vec::with_capacity(fields.len());
                    for (column_name, column_value) in fields {
                        let column = match table.schema.column(column_name) {
                            Some(column) => column,
                            None if converting => continue,
                            None => {
                                return Err(Error::UnknownColumn {
                                    table: key.clone(),
                                    column: column_name.clone(),
                                })
                            }
                        };
                        let datum = Datum::from_json(column.column_type, column_value)?;
                        parsed.push((column.index, datum));
                    }

                    if table.get(&uuid).is_some() {
                        txn.row_modify(key.clone(), uuid, parsed);
                    } else {
                        txn.row_insert(key.clone(), uuid, parsed);
                    }
                }
                _ => {
                    return Err(Error::InvalidRowValue {
                        table: key.clone(),
                        uuid: uuid_str.clone(),
                    })
                }
            }
        }
    }

    Ok(txn)
}

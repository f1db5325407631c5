use serde_json::{Map, Value};
use statedb_engine::{Change, Database};
use statedb_log::Log;

use crate::error::Result;

/// Write a whole database into a fresh, empty log: the schema as record 0,
/// then a single delta holding every live row as a freshly-inserted row.
///
/// Returns the on-disk byte length of record 1 (header, payload and
/// trailing newline), matching how [`crate::DatabaseFile::open`] measures
/// `snapshot_size` from the log's own offsets -- both feed the same
/// compaction-gate comparison against the log's total size.
pub fn write_snapshot(log: &mut Log, db: &Database, comment: Option<&str>) -> Result<u64> {
    log.write(&db.schema.to_json())?;

    let changes: Vec<Change> = db
        .tables()
        .flat_map(|(name, table)| {
            table.rows().map(move |row| Change::Insert {
                table: name.clone(),
                uuid: row.uuid(),
                fields: row.fields.clone(),
            })
        })
        .collect();

    let now_millis = crate::now_millis();
    let delta = statedb_codec::encode(&changes, &db.schema, comment, now_millis).unwrap_or_else(|| {
        let mut top = Map::new();
        top.insert("_date".into(), Value::from(now_millis));
        if let Some(comment) = comment {
            top.insert("_comment".into(), Value::String(comment.to_string()));
        }
        Value::Object(top)
    });

    let offset_before = log.offset();
    log.write(&delta)?;
    log.commit()?;
    Ok(log.offset() - offset_before)
}

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use chrono::{Local, TimeZone};
use serde_json::Value;
use statedb_log::{magic, peek_magic, Locking, Log, Mode};
use statedb_model::Schema;
use uuid::Uuid;

use crate::error::{Error, Result};

/// How much detail to print. `0` is one summary line per record; `1` also
/// lists each changed row; `2` and above additionally show field-level
/// values. Built from a CLI's repeated `-m` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

/// Read `path` record-by-record and write a human-readable report to `out`.
///
/// Dispatches on the log's magic token: a standalone log is rendered with
/// full knowledge of the schema and row identities, a clustered log is
/// rendered field-by-field with no semantic validation.
pub fn inspect(path: impl AsRef<Path>, verbosity: Verbosity, out: &mut impl Write) -> Result<()> {
    let magic = peek_magic(path.as_ref())?;
    match magic.as_str() {
        magic::STANDALONE => render_standalone(path, verbosity, out),
        magic::CLUSTERED => render_clustered(path, verbosity, out),
        other => Err(Error::UnrecognizedMagic(other.to_string())),
    }
}

/// Tracks, per table, which row UUIDs are currently known to exist -- so a
/// row object can be told apart as an insert or a modify -- and a
/// best-known display name per UUID, so deletes stay legible.
#[derive(Default)]
struct ReplayState {
    existing: HashMap<String, HashSet<Uuid>>,
    names: HashMap<Uuid, String>,
}

fn render_standalone(path: impl AsRef<Path>, verbosity: Verbosity, out: &mut impl Write) -> Result<()> {
    let mut log = Log::open(path, magic::STANDALONE, Mode::ReadOnly, Locking::No)?;

    let record0 = log.read()?.ok_or_else(|| Error::UnrecognizedMagic("empty log".to_string()))?;
    let schema = Schema::from_json(&record0)?;
    writeln!(out, "schema {:?} version {:?} ({} table(s))", schema.name, schema.version, schema.tables.len())?;

    // Tables with a literal "name" column get their display name tracked
    // from observed field values; tables without one always fall back to
    // the first eight hex characters of the row's own UUID.
    let named_tables: HashMap<&str, bool> = schema
        .tables
        .iter()
        .map(|t| (t.name.as_str(), t.column("name").is_some()))
        .collect();
    let mut state = ReplayState::default();

    let mut index: u64 = 1;
    loop {
        let record = match log.read() {
            Ok(None) => break,
            Ok(Some(record)) => record,
            Err(e) => {
                writeln!(out, "record {index}: stopping, {e}")?;
                break;
            }
        };
        render_delta(out, index, &record, &named_tables, &mut state, verbosity)?;
        index += 1;
    }
    Ok(())
}

fn render_delta(
    out: &mut impl Write,
    index: u64,
    record: &Value,
    named_tables: &HashMap<&str, bool>,
    state: &mut ReplayState,
    verbosity: Verbosity,
) -> Result<()> {
    let Some(obj) = record.as_object() else {
        writeln!(out, "record {index}: not an object")?;
        return Ok(());
    };

    let date = obj.get("_date").and_then(Value::as_i64).map(render_timestamp);
    let comment = obj.get("_comment").and_then(Value::as_str);

    let mut inserted = 0u64;
    let mut modified = 0u64;
    let mut deleted = 0u64;
    let mut lines = Vec::new();

    for (table, rows) in obj {
        if table == "_date" || table == "_comment" {
            continue;
        }
        let Some(rows) = rows.as_object() else { continue };
        let tracks_names = named_tables.get(table.as_str()).copied().unwrap_or(false);
        let existing = state.existing.entry(table.clone()).or_default();

        for (uuid_str, value) in rows {
            let Ok(uuid) = Uuid::parse_str(uuid_str) else { continue };
            match value {
                Value::Null => {
                    deleted += 1;
                    existing.remove(&uuid);
                    let name = state.names.remove(&uuid).unwrap_or_else(|| short(uuid_str));
                    lines.push(format!("  - {table} {name} deleted"));
                }
                Value::Object(fields) => {
                    let is_insert = existing.insert(uuid);
                    if is_insert {
                        inserted += 1;
                    } else {
                        modified += 1;
                    }
                    let name = display_name(uuid_str, uuid, fields, tracks_names, &mut state.names);
                    let action = if is_insert { "inserted" } else { "modified" };
                    let mut line = format!("  - {table} {name} {action} ({} field(s))", fields.len());
                    if verbosity.0 >= 2 {
                        line.push(' ');
                        line.push_str(&Value::Object(fields.clone()).to_string());
                    }
                    lines.push(line);
                }
                _ => {}
            }
        }
    }

    let mut header = format!("record {index}");
    if let Some(date) = date {
        header.push_str(&format!(" {date}"));
    }
    header.push_str(&format!(" ({inserted} inserted, {modified} modified, {deleted} deleted)"));
    if let Some(comment) = comment {
        header.push_str(&format!(" -- {comment}"));
    }
    writeln!(out, "{header}")?;

    if verbosity.0 >= 1 {
        for line in lines {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn display_name(
    uuid_str: &str,
    uuid: Uuid,
    fields: &serde_json::Map<String, Value>,
    tracks_names: bool,
    names: &mut HashMap<Uuid, String>,
) -> String {
    if tracks_names {
        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            names.insert(uuid, name.to_string());
            return name.to_string();
        }
        if let Some(known) = names.get(&uuid) {
            return known.clone();
        }
    }
    short(uuid_str)
}

fn short(uuid_str: &str) -> String {
    uuid_str.chars().take(8).collect()
}

/// Legacy logs stored `_date` in whole seconds; current logs store
/// milliseconds. If the raw value fits in a signed 32-bit integer it is
/// reinterpreted as seconds and scaled up -- a modern millisecond timestamp
/// is always well outside that range, so this is unambiguous in practice.
fn render_timestamp(raw: i64) -> String {
    let millis = if (i32::MIN as i64..=i32::MAX as i64).contains(&raw) { raw * 1000 } else { raw };
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => format!("<invalid timestamp {raw}>"),
    }
}

/// Fields the clustered (consensus-replicated) format is known to carry.
/// Printed by name only, with no semantic validation -- this crate never
/// opens a clustered log for replay.
const CLUSTERED_FIELDS: &[&str] = &["term", "index", "data", "servers", "vote"];

fn render_clustered(path: impl AsRef<Path>, _verbosity: Verbosity, out: &mut impl Write) -> Result<()> {
    let mut log = Log::open(path, magic::CLUSTERED, Mode::ReadOnly, Locking::No)?;
    let mut index = 0u64;
    loop {
        let record = match log.read() {
            Ok(None) => break,
            Ok(Some(record)) => record,
            Err(e) => {
                writeln!(out, "record {index}: stopping, {e}")?;
                break;
            }
        };
        let mut parts = Vec::new();
        if let Some(obj) = record.as_object() {
            for field in CLUSTERED_FIELDS {
                if let Some(value) = obj.get(*field) {
                    parts.push(format!("{field}={value}"));
                }
            }
        }
        writeln!(out, "record {index}: {}", parts.join(" "))?;
        index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statedb_file::DatabaseFile;
    use statedb_model::{ColumnSchema, ColumnType, Schema as ModelSchema, TableSchema};

    fn schema() -> ModelSchema {
        ModelSchema {
            name: "mini".into(),
            version: "1".into(),
            checksum: String::new(),
            tables: vec![TableSchema {
                name: "people".into(),
                columns: vec![
                    ColumnSchema {
                        index: 0,
                        name: "name".into(),
                        persistent: true,
                        column_type: ColumnType::String,
                    },
                    ColumnSchema {
                        index: 1,
                        name: "age".into(),
                        persistent: true,
                        column_type: ColumnType::Integer,
                    },
                ],
            }],
        }
    }

    #[test]
    fn renders_inserts_and_respects_verbosity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.log");
        let mut file = DatabaseFile::create(&path, schema()).unwrap();

        let uuid = Uuid::new_v4();
        let mut txn = statedb_engine::Transaction::create();
        txn.row_insert(
            "people",
            uuid,
            vec![(0, statedb_model::Datum::Str("Ada".into())), (1, statedb_model::Datum::Int(30))],
        );
        file.commit(txn, true).unwrap();
        drop(file);

        let mut out = Vec::new();
        inspect(&path, Verbosity(0), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("schema"));
        assert!(report.contains("1 inserted"));
        assert!(!report.contains("Ada"));

        let mut out = Vec::new();
        inspect(&path, Verbosity(1), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("inserted"));
        assert!(!report.contains("Ada"));

        let mut out = Vec::new();
        inspect(&path, Verbosity(2), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("Ada"));
    }

    #[test]
    fn modify_after_insert_is_not_double_counted_as_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.log");
        let mut file = DatabaseFile::create(&path, schema()).unwrap();

        let uuid = Uuid::new_v4();
        let mut txn = statedb_engine::Transaction::create();
        txn.row_insert("people", uuid, vec![(0, statedb_model::Datum::Str("Ada".into()))]);
        file.commit(txn, true).unwrap();

        let mut txn = statedb_engine::Transaction::create();
        txn.row_modify("people", uuid, vec![(1, statedb_model::Datum::Int(31))]);
        file.commit(txn, true).unwrap();
        drop(file);

        let mut out = Vec::new();
        inspect(&path, Verbosity(1), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("1 inserted, 0 modified"));
        assert!(report.contains("0 inserted, 1 modified"));
    }

    #[test]
    fn unrecognized_magic_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.log");
        let mut log = Log::open(&path, "NOPE", Mode::CreateExclusive, Locking::No).unwrap();
        log.write(&serde_json::json!({})).unwrap();
        log.commit().unwrap();
        drop(log);

        let mut out = Vec::new();
        assert!(inspect(&path, Verbosity(0), &mut out).is_err());
    }
}

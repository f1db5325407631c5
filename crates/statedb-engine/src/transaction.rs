use std::collections::{HashMap, HashSet};

use statedb_model::Datum;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::row::Row;

enum Op {
    Insert { table: String, uuid: Uuid, fields: Vec<(usize, Datum)> },
    Modify { table: String, uuid: Uuid, fields: Vec<(usize, Datum)> },
    Delete { table: String, uuid: Uuid },
}

/// One committed row change, as produced by [`Transaction::commit`] and
/// consumed by `statedb-codec`'s encoder.
///
/// This is the typed stand-in for the engine's `(table, old_row?, new_row?,
/// changed_bitmap?)` change triple: whether a row was freshly inserted or
/// merely modified is represented by which enum variant it is, rather than
/// by the presence or absence of an "old row" value.
pub enum Change {
    Insert { table: String, uuid: Uuid, fields: Vec<Datum> },
    Modify { table: String, uuid: Uuid, fields: Vec<Datum>, changed: Vec<bool> },
    Delete { table: String, uuid: Uuid },
}

impl Change {
    pub fn table(&self) -> &str {
        match self {
            Change::Insert { table, .. } | Change::Modify { table, .. } | Change::Delete { table, .. } => table,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Change::Insert { uuid, .. } | Change::Modify { uuid, .. } | Change::Delete { uuid, .. } => *uuid,
        }
    }
}

/// `transaction_create`/`_row_modify`/`_row_insert`/`_row_delete`/`_commit`/
/// `_abort`: a batch of row operations recorded against a schema, applied to
/// a [`Database`] all at once on [`Transaction::commit`].
#[derive(Default)]
pub struct Transaction {
    ops: Vec<Op>,
    comment: Option<String>,
}

impl Transaction {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn row_insert(&mut self, table: impl Into<String>, uuid: Uuid, fields: Vec<(usize, Datum)>) {
        self.ops.push(Op::Insert {
            table: table.into(),
            uuid,
            fields,
        });
    }

    pub fn row_modify(&mut self, table: impl Into<String>, uuid: Uuid, fields: Vec<(usize, Datum)>) {
        self.ops.push(Op::Modify {
            table: table.into(),
            uuid,
            fields,
        });
    }

    pub fn row_delete(&mut self, table: impl Into<String>, uuid: Uuid) {
        self.ops.push(Op::Delete {
            table: table.into(),
            uuid,
        });
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// `transaction_get_comment`.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// `transaction_abort`: discard without applying anything.
    pub fn abort(self) {}

    /// `transaction_commit`: apply every recorded operation to `db`,
    /// returning the resulting change set for `transaction_for_each_change`
    /// (here, plain iteration) to hand to the codec.
    ///
    /// All ops are validated against `db` before any of them mutate it, so a
    /// transaction that fails partway (e.g. a delete of a row that does not
    /// exist) leaves `db` completely unchanged rather than baking in the
    /// ops that happened to precede the bad one.
    ///
    /// Durability of the *log* record this produces is the caller's
    /// concern, not this engine's; this only mutates in-memory state.
    pub fn commit(self, db: &mut Database) -> Result<Vec<Change>> {
        validate(db, &self.ops)?;
        let mut changes = Vec::with_capacity(self.ops.len());
        for op in self.ops {
            changes.push(apply(db, op)?);
        }
        Ok(changes)
    }
}

/// Check every op's preconditions (table exists, column indices exist, rows
/// exist or don't as the op requires) against `db`'s current contents
/// without mutating it. Simulates the existence effect of earlier ops in the
/// same transaction so a later op that depends on them (e.g. modifying a row
/// inserted earlier in the same transaction) validates correctly.
fn validate(db: &Database, ops: &[Op]) -> Result<()> {
    let mut existing: HashMap<&str, HashSet<Uuid>> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert { table, uuid, fields } => {
                let n_columns = db.table(table).ok_or_else(|| Error::UnknownTable(table.clone()))?.schema.columns.len();
                for (idx, _) in fields {
                    if *idx >= n_columns {
                        return Err(Error::UnknownColumn { table: table.clone(), index: *idx });
                    }
                }
                load_existing(db, &mut existing, table)?;
                if !existing.get_mut(table.as_str()).unwrap().insert(*uuid) {
                    return Err(Error::RowAlreadyExists { table: table.clone(), uuid: *uuid });
                }
            }
            Op::Modify { table, uuid, fields } => {
                let n_columns = db.table(table).ok_or_else(|| Error::UnknownTable(table.clone()))?.schema.columns.len();
                for (idx, _) in fields {
                    if *idx >= n_columns {
                        return Err(Error::UnknownColumn { table: table.clone(), index: *idx });
                    }
                }
                load_existing(db, &mut existing, table)?;
                if !existing.get(table.as_str()).unwrap().contains(uuid) {
                    return Err(Error::RowNotFound { table: table.clone(), uuid: *uuid });
                }
            }
            Op::Delete { table, uuid } => {
                load_existing(db, &mut existing, table)?;
                if !existing.get_mut(table.as_str()).unwrap().remove(uuid) {
                    return Err(Error::RowNotFound { table: table.clone(), uuid: *uuid });
                }
            }
        }
    }
    Ok(())
}

/// Populate `existing`'s entry for `table` from `db`'s current rows, the
/// first time the table is touched during [`validate`].
fn load_existing<'a>(db: &'a Database, existing: &mut HashMap<&'a str, HashSet<Uuid>>, table: &'a str) -> Result<()> {
    if !existing.contains_key(table) {
        let t = db.table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;
        existing.insert(table, t.rows().map(Row::uuid).collect());
    }
    Ok(())
}

fn apply(db: &mut Database, op: Op) -> Result<Change> {
    match op {
        Op::Insert { table, uuid, fields } => {
            let schema = db
                .table(&table)
                .ok_or_else(|| Error::UnknownTable(table.clone()))?
                .schema
                .clone();
            let t = db.table_mut(&table)?;
            if t.get(&uuid).is_some() {
                return Err(Error::RowAlreadyExists { table, uuid });
            }
            let mut values: Vec<Datum> = schema.columns.iter().map(|c| Datum::default_for(c.column_type)).collect();
            for (idx, value) in fields {
                *values.get_mut(idx).ok_or(Error::UnknownColumn { table: table.clone(), index: idx })? = value;
            }
            t.insert(Row::new(uuid, values.clone()));
            Ok(Change::Insert { table, uuid, fields: values })
        }
        Op::Modify { table, uuid, fields } => {
            let n_columns = db
                .table(&table)
                .ok_or_else(|| Error::UnknownTable(table.clone()))?
                .schema
                .columns
                .len();
            let t = db.table_mut(&table)?;
            let row = t.get_mut(&uuid).ok_or_else(|| Error::RowNotFound { table: table.clone(), uuid })?;
            let mut changed = vec![false; n_columns];
            for (idx, value) in fields {
                let slot = row
                    .fields
                    .get_mut(idx)
                    .ok_or_else(|| Error::UnknownColumn { table: table.clone(), index: idx })?;
                *slot = value;
                changed[idx] = true;
            }
            Ok(Change::Modify {
                table,
                uuid,
                fields: row.fields.clone(),
                changed,
            })
        }
        Op::Delete { table, uuid } => {
            let t = db.table_mut(&table)?;
            t.remove(&uuid).ok_or_else(|| Error::RowNotFound { table: table.clone(), uuid })?;
            Ok(Change::Delete { table, uuid })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statedb_model::{ColumnSchema, ColumnType, Schema, TableSchema};

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
    fn insert_then_modify_then_delete() {
        let mut db = Database::create(schema());
        let uuid = Uuid::new_v4();

        let mut txn = Transaction::create();
        txn.row_insert("T", uuid, vec![(0, Datum::Str("a".into())), (1, Datum::Int(1))]);
        let changes = txn.commit(&mut db).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], Change::Insert { .. }));
        assert_eq!(db.table("T").unwrap().len(), 1);

        let mut txn = Transaction::create();
        txn.row_modify("T", uuid, vec![(1, Datum::Int(2))]);
        let changes = txn.commit(&mut db).unwrap();
        match &changes[0] {
            Change::Modify { changed, fields, .. } => {
                assert_eq!(changed.as_slice(), [false, true]);
                assert_eq!(fields[1], Datum::Int(2));
            }
            _ => panic!("expected modify"),
        }

        let mut txn = Transaction::create();
        txn.row_delete("T", uuid);
        txn.commit(&mut db).unwrap();
        assert!(db.table("T").unwrap().is_empty());
    }

    #[test]
    fn delete_of_missing_row_is_an_error() {
        let mut db = Database::create(schema());
        let mut txn = Transaction::create();
        txn.row_delete("T", Uuid::new_v4());
        assert!(txn.commit(&mut db).is_err());
    }

    #[test]
    fn insert_of_existing_row_is_an_error() {
        let mut db = Database::create(schema());
        let uuid = Uuid::new_v4();
        let mut txn = Transaction::create();
        txn.row_insert("T", uuid, vec![]);
        txn.commit(&mut db).unwrap();

        let mut txn = Transaction::create();
        txn.row_insert("T", uuid, vec![]);
        assert!(txn.commit(&mut db).is_err());
    }

    /// A transaction that modifies an existing row and then deletes a
    /// missing one must leave `db` untouched by the modify, not just abort
    /// before the delete.
    #[test]
    fn a_later_op_failing_rolls_back_an_earlier_ops_mutation() {
        let mut db = Database::create(schema());
        let u1 = Uuid::new_v4();
        let mut insert = Transaction::create();
        insert.row_insert("T", u1, vec![(0, Datum::Str("a".into())), (1, Datum::Int(1))]);
        insert.commit(&mut db).unwrap();

        let u2 = Uuid::new_v4();
        let mut txn = Transaction::create();
        txn.row_modify("T", u1, vec![(1, Datum::Int(2))]);
        txn.row_delete("T", u2);
        assert!(txn.commit(&mut db).is_err());

        let row = db.table("T").unwrap().get(&u1).unwrap();
        assert_eq!(row.fields[1], Datum::Int(1));
    }
}

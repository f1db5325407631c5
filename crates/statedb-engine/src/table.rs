use std::collections::HashMap;

use statedb_model::TableSchema;
use uuid::Uuid;

use crate::row::Row;

/// A table: its schema, plus its live rows keyed by UUID.
pub struct Table {
    pub schema: TableSchema,
    rows: HashMap<Uuid, Row>,
}

impl Table {
    pub fn empty(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: HashMap::new(),
        }
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&Row> {
        self.rows.get(uuid)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn insert(&mut self, row: Row) {
        self.rows.insert(row.uuid(), row);
    }

    pub(crate) fn get_mut(&mut self, uuid: &Uuid) -> Option<&mut Row> {
        self.rows.get_mut(uuid)
    }

    pub(crate) fn remove(&mut self, uuid: &Uuid) -> Option<Row> {
        self.rows.remove(uuid)
    }
}

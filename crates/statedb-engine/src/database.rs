use std::collections::HashMap;

use statedb_model::Schema;

use crate::error::{Error, Result};
use crate::table::Table;

/// A live, in-memory database: a schema plus one table per schema entry.
///
/// Owned by a `statedb-file` database-file object for the purpose of
/// compaction, but shared with the caller for the lifetime of that file --
/// closing the file does not destroy this.
pub struct Database {
    pub schema: Schema,
    tables: HashMap<String, Table>,
}

impl Database {
    /// `database_create`: build an empty database from a schema.
    pub fn create(schema: Schema) -> Self {
        let tables = schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), Table::empty(t.clone())))
            .collect();
        Self { schema, tables }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables.get_mut(name).ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }
}

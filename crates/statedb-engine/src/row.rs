use statedb_model::Datum;
use uuid::Uuid;

/// A single row. Its UUID is its identity, not a member of `fields` --
/// `fields[idx]` corresponds to the table schema's column at `idx`.
#[derive(Debug, Clone)]
pub struct Row {
    uuid: Uuid,
    pub fields: Vec<Datum>,
}

impl Row {
    pub fn new(uuid: Uuid, fields: Vec<Datum>) -> Self {
        Self { uuid, fields }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

use crate::error::{Error, Result};

/// The type of a single column's values.
///
/// `Bytes` is encoded as base64 in JSON; the other variants map onto JSON's
/// own string/number/bool primitives directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Bool,
    Bytes,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Bytes => "bytes",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(ColumnType::String),
            "integer" => Ok(ColumnType::Integer),
            "float" => Ok(ColumnType::Float),
            "bool" => Ok(ColumnType::Bool),
            "bytes" => Ok(ColumnType::Bytes),
            other => Err(Error::UnknownColumnType(other.to_string())),
        }
    }
}

/// One column of a [`crate::TableSchema`].
///
/// `index` is the column's position among its table's persistent data
/// columns; it is assigned at schema-load time from declaration order and is
/// never itself serialized. The row's own identity (its UUID) is a separate
/// concept tracked by `statedb-engine`'s `Row`, not a member of this list.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub index: usize,
    pub name: String,
    pub persistent: bool,
    pub column_type: ColumnType,
}

use base64::Engine;
use serde_json::Value;

use crate::column::ColumnType;
use crate::error::{Error, Result};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl Datum {
    /// The type's zero value: `""`, `0`, `0.0`, `false`, or an empty byte
    /// string. Used to decide whether a column is worth emitting on insert.
    pub fn default_for(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::String => Datum::Str(String::new()),
            ColumnType::Integer => Datum::Int(0),
            ColumnType::Float => Datum::Float(0.0),
            ColumnType::Bool => Datum::Bool(false),
            ColumnType::Bytes => Datum::Bytes(Vec::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Datum::Str(_) => ColumnType::String,
            Datum::Int(_) => ColumnType::Integer,
            Datum::Float(_) => ColumnType::Float,
            Datum::Bool(_) => ColumnType::Bool,
            Datum::Bytes(_) => ColumnType::Bytes,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Datum::default_for(self.column_type())
    }

    pub fn from_json(column_type: ColumnType, json: &Value) -> Result<Self> {
        let mismatch = || Error::TypeMismatch {
            expected: column_type,
            found: json.to_string(),
        };
        match column_type {
            ColumnType::String => Ok(Datum::Str(json.as_str().ok_or_else(mismatch)?.to_string())),
            ColumnType::Integer => Ok(Datum::Int(json.as_i64().ok_or_else(mismatch)?)),
            ColumnType::Float => Ok(Datum::Float(json.as_f64().ok_or_else(mismatch)?)),
            ColumnType::Bool => Ok(Datum::Bool(json.as_bool().ok_or_else(mismatch)?)),
            ColumnType::Bytes => {
                let encoded = json.as_str().ok_or_else(mismatch)?;
                let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
                Ok(Datum::Bytes(bytes))
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Datum::Str(s) => Value::String(s.clone()),
            Datum::Int(i) => Value::Number((*i).into()),
            Datum::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Datum::Bool(b) => Value::Bool(*b),
            Datum::Bytes(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
        }
    }

    /// `datum_swap`: exchange values in place.
    pub fn swap(&mut self, other: &mut Datum) {
        std::mem::swap(self, other);
    }
}

use crate::error::{CoerceError, SchemaError};
use crate::timestamp::Timestamp;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// The closed set of column types a schema can declare.
///
/// The serde wire names are the lowercase variant names (`"string"`,
/// `"integer64"`, `"float64"`, `"boolean"`, `"timestamp"`); anything else is
/// rejected at configuration-decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer64,
    Float64,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer64 => "integer64",
            ColumnType::Float64 => "float64",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::String
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a schema. `index` is the column's position in the owning
/// schema's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub name: String,
    pub data_type: ColumnType,
}

/// An ordered sequence of uniquely-named columns with indices `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Validate an explicit column list: non-empty unique names, and each
    /// column's `index` matching its position.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for (expected, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(SchemaError::EmptyName { index: expected });
            }
            if column.index != expected {
                return Err(SchemaError::IndexMismatch {
                    name: column.name.clone(),
                    index: column.index,
                    expected,
                });
            }
            if !seen.insert(column.name.clone()) {
                return Err(SchemaError::DuplicateName {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Schema { columns })
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { columns: Vec::new() }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builds a schema column by column, assigning indices positionally.
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn add(mut self, name: impl Into<String>, data_type: ColumnType) -> Self {
        let index = self.columns.len();
        self.columns.push(Column {
            index,
            name: name.into(),
            data_type,
        });
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self.columns)
    }
}

/// Wire form of a column: index is positional, so only name and type appear.
#[derive(Serialize, Deserialize)]
struct ColumnDef {
    name: String,
    #[serde(rename = "type")]
    data_type: ColumnType,
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let defs: Vec<ColumnDef> = self
            .columns
            .iter()
            .map(|c| ColumnDef {
                name: c.name.clone(),
                data_type: c.data_type,
            })
            .collect();
        defs.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let defs = Vec::<ColumnDef>::deserialize(deserializer)?;
        let mut builder = Schema::builder();
        for def in defs {
            builder = builder.add(def.name, def.data_type);
        }
        builder.build().map_err(D::Error::custom)
    }
}

/// A single typed cell value. `Null` models an absent value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer64(i64),
    Float64(f64),
    Boolean(bool),
    Timestamp(Timestamp),
}

/// One record: cell values in schema order.
pub type Row = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer64(_) => "integer64",
            Value::Float64(_) => "float64",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Read this value as `data_type`. A `Null` passes through unchanged;
    /// a same-typed value is copied without conversion (so no precision is
    /// lost); anything else fails.
    pub fn coerce(&self, data_type: ColumnType) -> Result<Value, CoerceError> {
        match (data_type, self) {
            (_, Value::Null)
            | (ColumnType::String, Value::String(_))
            | (ColumnType::Integer64, Value::Integer64(_))
            | (ColumnType::Float64, Value::Float64(_))
            | (ColumnType::Boolean, Value::Boolean(_))
            | (ColumnType::Timestamp, Value::Timestamp(_)) => Ok(self.clone()),
            (expected, found) => Err(CoerceError {
                expected,
                found: found.type_name(),
            }),
        }
    }

    /// Decode a JSON cell into the typed value a column of `data_type`
    /// expects. Timestamps are accepted as RFC 3339-style strings.
    pub fn from_json(
        json: &serde_json::Value,
        data_type: ColumnType,
    ) -> Result<Value, CoerceError> {
        use serde_json::Value as Json;

        let mismatch = |found| CoerceError {
            expected: data_type,
            found,
        };

        match (data_type, json) {
            (_, Json::Null) => Ok(Value::Null),
            (ColumnType::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (ColumnType::Integer64, Json::Number(n)) => n
                .as_i64()
                .map(Value::Integer64)
                .ok_or_else(|| mismatch("number")),
            (ColumnType::Float64, Json::Number(n)) => n
                .as_f64()
                .map(Value::Float64)
                .ok_or_else(|| mismatch("number")),
            (ColumnType::Boolean, Json::Bool(b)) => Ok(Value::Boolean(*b)),
            (ColumnType::Timestamp, Json::String(s)) => Timestamp::parse(s)
                .map(Value::Timestamp)
                .map_err(|_| mismatch("string")),
            (_, other) => Err(mismatch(json_type_name(other))),
        }
    }

    /// Encode this value as JSON. Timestamps render as RFC 3339 text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Integer64(n) => serde_json::Value::from(*n),
            Value::Float64(n) => serde_json::Value::from(*n),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(t) => serde_json::Value::String(t.to_string()),
        }
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

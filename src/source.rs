//! Input row sources.
//!
//! The driver only depends on the [`RowSource`] capability. A
//! [`JsonRowSource`] decodes newline-delimited JSON objects into typed rows
//! against the input schema; hosts with their own transport implement
//! [`RowSource`] directly.

use crate::error::ResourceError;
use crate::types::{Row, Schema, Value};
use std::io::BufRead;

/// Produces a lazy, finite sequence of input rows. `Ok(None)` means the
/// source is exhausted.
pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<Row>, ResourceError>;
}

/// Decode one JSON object into a typed row, cell by cell in schema order.
/// Fields missing from the object read as null.
pub fn decode_row(json: &serde_json::Value, schema: &Schema) -> Result<Row, ResourceError> {
    let object = json
        .as_object()
        .ok_or_else(|| ResourceError::Decode("expected a JSON object".to_string()))?;

    schema
        .columns()
        .iter()
        .map(|column| {
            let cell = object.get(&column.name).unwrap_or(&serde_json::Value::Null);
            Value::from_json(cell, column.data_type)
                .map_err(|e| ResourceError::Decode(format!("column `{}`: {}", column.name, e)))
        })
        .collect()
}

/// Reads newline-delimited JSON objects conforming to the input schema.
/// Blank lines are skipped.
pub struct JsonRowSource<R: BufRead> {
    reader: R,
    schema: Schema,
    line: String,
    line_number: usize,
}

impl<R: BufRead> JsonRowSource<R> {
    pub fn new(reader: R, schema: Schema) -> Self {
        JsonRowSource {
            reader,
            schema,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> RowSource for JsonRowSource<R> {
    fn next_row(&mut self) -> Result<Option<Row>, ResourceError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let json: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                ResourceError::Decode(format!("line {}: {}", self.line_number, e))
            })?;
            return decode_row(&json, &self.schema).map(Some);
        }
    }
}

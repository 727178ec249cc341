//! Output row sinks.
//!
//! The expander only depends on the [`RowSink`] capability; hosts plug in
//! their own transport. [`JsonLinesSink`] writes one JSON object per output
//! row, [`MemorySink`] collects rows in memory.

use crate::error::ResourceError;
use crate::types::{Row, Schema};
use std::io::Write;

/// Accepts output rows for one batch. `finish` flushes, `close` releases;
/// `close` must be idempotent and safe after an error.
pub trait RowSink {
    fn write(&mut self, row: Row) -> Result<(), ResourceError>;
    fn finish(&mut self) -> Result<(), ResourceError>;
    fn close(&mut self);
}

/// Writes each row as a JSON object keyed by output column name, one per
/// line.
pub struct JsonLinesSink<W: Write> {
    writer: Option<W>,
    schema: Schema,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, schema: Schema) -> Self {
        JsonLinesSink {
            writer: Some(writer),
            schema,
        }
    }
}

impl<W: Write> RowSink for JsonLinesSink<W> {
    fn write(&mut self, row: Row) -> Result<(), ResourceError> {
        debug_assert_eq!(row.len(), self.schema.len());
        let writer = self.writer.as_mut().ok_or(ResourceError::Closed)?;

        let mut object = serde_json::Map::with_capacity(row.len());
        for (column, cell) in self.schema.columns().iter().zip(&row) {
            object.insert(column.name.clone(), cell.to_json());
        }
        let line = serde_json::to_string(&object)?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.writer = None;
    }
}

/// Collects rows in memory. Used as a test double and by embedders that
/// want the expanded batch as a `Vec`.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<Row>,
    pub finished: bool,
    pub closed: bool,
}

impl RowSink for MemorySink {
    fn write(&mut self, row: Row) -> Result<(), ResourceError> {
        if self.closed {
            return Err(ResourceError::Closed);
        }
        self.rows.push(row);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        self.finished = true;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnType, Value};

    fn key_value_schema() -> Schema {
        Schema::builder()
            .add("key", ColumnType::String)
            .add("value", ColumnType::Integer64)
            .build()
            .unwrap()
    }

    #[test]
    fn test_json_lines_output() {
        let mut buffer = Vec::new();
        let mut sink = JsonLinesSink::new(&mut buffer, key_value_schema());

        sink.write(vec![Value::String("age".into()), Value::Integer64(20)])
            .unwrap();
        sink.write(vec![Value::String("score".into()), Value::Null])
            .unwrap();
        sink.finish().unwrap();
        sink.close();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec![
            r#"{"key":"age","value":20}"#,
            r#"{"key":"score","value":null}"#,
        ]);
    }

    #[test]
    fn test_write_after_close_fails() {
        let mut buffer = Vec::new();
        let mut sink = JsonLinesSink::new(&mut buffer, key_value_schema());
        sink.close();

        let result = sink.write(vec![Value::String("age".into()), Value::Integer64(20)]);
        assert!(matches!(result, Err(ResourceError::Closed)));
        // close stays idempotent, finish after close is a no-op
        sink.close();
        assert!(sink.finish().is_ok());
    }

    #[test]
    fn test_memory_sink_records_lifecycle() {
        let mut sink = MemorySink::default();
        sink.write(vec![Value::Boolean(true)]).unwrap();
        sink.finish().unwrap();
        sink.close();

        assert_eq!(sink.rows.len(), 1);
        assert!(sink.finished);
        assert!(sink.closed);
        assert!(matches!(
            sink.write(vec![Value::Null]),
            Err(ResourceError::Closed)
        ));
    }
}

//! Streaming row expansion driven by a pre-computed plan.
//!
//! One [`RowExpander`] owns one physical batch: the host calls `add` for
//! every input row, then `finish` to flush and `close` to release the sink.
//! The plan is shared read-only, so independent batches of the same stream
//! can run on separate workers, each with its own expander and sink.

use crate::error::ResourceError;
use crate::plan::PivotPlan;
use crate::sink::RowSink;
use crate::types::{Row, Value};
use std::sync::Arc;
use tracing::warn;

/// Expands wide input rows into long key/value output rows.
///
/// For every expanding column of every input row, one output row is emitted:
/// the common column values (in input order), the expanding column's name as
/// the key, and its value coerced to the declared value type. A value that
/// cannot be read as the value type is skipped with a warning; the batch is
/// never aborted by bad data.
pub struct RowExpander<S: RowSink> {
    plan: Arc<PivotPlan>,
    sink: S,
    emitted: u64,
    skipped: u64,
    closed: bool,
}

impl<S: RowSink> RowExpander<S> {
    /// Open an expander for one batch. The sink is exclusively owned until
    /// [`close`](Self::close).
    pub fn open(plan: Arc<PivotPlan>, sink: S) -> Self {
        RowExpander {
            plan,
            sink,
            emitted: 0,
            skipped: 0,
            closed: false,
        }
    }

    /// Expand one input row into `expanding_columns().len()` output rows.
    ///
    /// Per-value coercion failures are absorbed: the offending expansion is
    /// skipped and counted, later columns of the same row still emit. Sink
    /// failures are fatal and propagate.
    pub fn add(&mut self, row: &Row) -> Result<(), ResourceError> {
        debug_assert_eq!(row.len(), self.plan.input_arity());

        let value_type = self.plan.value_type();
        for column in self.plan.expanding_columns() {
            // missing trailing cells read as null
            let coerced = match row.get(column.index) {
                Some(cell) => cell.coerce(value_type),
                None => Ok(Value::Null),
            };
            let value = match coerced {
                Ok(value) => value,
                Err(reason) => {
                    warn!(column = %column.name, %reason, "skipping unreadable value");
                    self.skipped += 1;
                    continue;
                }
            };

            let mut output = Vec::with_capacity(self.plan.common_columns().len() + 2);
            for common in self.plan.common_columns() {
                output.push(row.get(common.index).cloned().unwrap_or(Value::Null));
            }
            // The key cell always carries the column name as a string, even
            // when the configured key column type is not string; the type
            // applies to schema metadata only.
            output.push(Value::String(column.name.clone()));
            output.push(value);

            self.sink.write(output)?;
            self.emitted += 1;
        }
        Ok(())
    }

    /// Signal end of input for this batch and flush the sink. No trailing
    /// row is emitted.
    pub fn finish(&mut self) -> Result<(), ResourceError> {
        self.sink.finish()
    }

    /// Release the sink. Safe to call repeatedly, after `finish`, or after
    /// an error; [`Drop`] calls it if the host forgets.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.sink.close();
        }
    }

    /// Output rows written so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Expansions skipped because the value could not be read.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: RowSink> Drop for RowExpander<S> {
    fn drop(&mut self) {
        self.close();
    }
}

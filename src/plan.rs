//! Column layout planning for one pivot stream.
//!
//! A [`PivotPlan`] is derived once from the input schema and configuration,
//! then shared read-only by every expander working on the stream. It holds
//! the common/expanding partition (input order preserved, with the original
//! input indices) and the derived output schema.

use crate::config::PivotConfig;
use crate::error::SchemaError;
use crate::types::{Column, ColumnType, Schema};
use tracing::debug;

/// Pre-computed partition and output layout. Immutable after derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotPlan {
    common: Vec<Column>,
    expanding: Vec<Column>,
    output_schema: Schema,
    value_type: ColumnType,
}

impl PivotPlan {
    /// Partition the input columns and derive the output schema.
    ///
    /// A single pass over the input decides membership by exact name match
    /// against `common_columns`; a configured name matching no input column
    /// is silently ignored. The output schema is the common columns
    /// (reindexed from 0) followed by the key and value columns.
    ///
    /// Deterministic: identical inputs always produce an identical plan.
    /// The only failure is a name collision in the derived output schema,
    /// e.g. a kept common column also named `key`.
    pub fn from_schema(input: &Schema, config: &PivotConfig) -> Result<Self, SchemaError> {
        let mut common = Vec::new();
        let mut expanding = Vec::new();
        for column in input.columns() {
            if config.common_columns.iter().any(|name| *name == column.name) {
                common.push(column.clone());
            } else {
                expanding.push(column.clone());
            }
        }

        let mut output = Vec::with_capacity(common.len() + 2);
        for column in &common {
            output.push(Column {
                index: output.len(),
                name: column.name.clone(),
                data_type: column.data_type,
            });
        }
        output.push(Column {
            index: output.len(),
            name: config.key.name.clone(),
            data_type: config.key.data_type,
        });
        output.push(Column {
            index: output.len(),
            name: config.value.name.clone(),
            data_type: config.value.data_type,
        });
        let output_schema = Schema::new(output)?;

        for column in output_schema.columns() {
            debug!(
                index = column.index,
                name = %column.name,
                data_type = %column.data_type,
                "derived output column"
            );
        }

        Ok(PivotPlan {
            common,
            expanding,
            output_schema,
            value_type: config.value.data_type,
        })
    }

    /// Input columns copied into every output row, in input order. Each
    /// keeps its original input index.
    pub fn common_columns(&self) -> &[Column] {
        &self.common
    }

    /// Input columns that expand into one output row each, in input order.
    /// Each keeps its original input index.
    pub fn expanding_columns(&self) -> &[Column] {
        &self.expanding
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    /// Declared type of the generated value column.
    pub fn value_type(&self) -> ColumnType {
        self.value_type
    }

    pub(crate) fn input_arity(&self) -> usize {
        self.common.len() + self.expanding.len()
    }
}

//! # Pivot - wide-to-long row reshaping
//!
//! A streaming schema transform that melts "wide" tabular records into
//! "long" key/value records: a configured set of common columns is copied
//! unchanged into every output row, and each remaining column becomes its
//! own output row carrying the column name as the key and the column value
//! as the value. One input row with N expanding columns produces N output
//! rows.
//!
//! ## Modules
//!
//! - **plan**: derive the common/expanding partition and output schema once
//!   per stream
//! - **expander**: stream rows through a plan, batch by batch
//! - **source** / **sink**: the two capability seams a host plugs into
//!
//! ## Quick Start
//!
//! ```rust
//! use pivot::{decode_config, ColumnType, MemorySink, PivotPlan, RowExpander, Schema, Value};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = Schema::builder()
//!     .add("user_id", ColumnType::String)
//!     .add("gender", ColumnType::String)
//!     .add("city", ColumnType::String)
//!     .build()?;
//! let config = decode_config(&json!({"common_columns": ["user_id"]}))?;
//! let plan = Arc::new(PivotPlan::from_schema(&schema, &config)?);
//!
//! let mut expander = RowExpander::open(plan, MemorySink::default());
//! expander.add(&vec![
//!     Value::String("user-123".into()),
//!     Value::String("male".into()),
//!     Value::String("Tokyo".into()),
//! ])?;
//! expander.finish()?;
//!
//! // ["user-123", "gender", "male"] and ["user-123", "city", "Tokyo"]
//! assert_eq!(expander.sink().rows.len(), 2);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};

pub mod config;
pub mod error;
pub mod expander;
pub mod plan;
pub mod sink;
pub mod source;
pub mod timestamp;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{decode_config, OutputColumnSpec, PivotConfig};
pub use error::{CoerceError, ConfigError, ResourceError, SchemaError};
pub use expander::RowExpander;
pub use plan::PivotPlan;
pub use sink::{JsonLinesSink, MemorySink, RowSink};
pub use source::{decode_row, JsonRowSource, RowSource};
pub use timestamp::Timestamp;
pub use types::{Column, ColumnType, Row, Schema, SchemaBuilder, Value};

/// Main entry point: drain a row source through an expander and finalize it.
pub fn run_pivot<Src, S>(source: &mut Src, expander: &mut RowExpander<S>) -> Result<()>
where
    Src: RowSource,
    S: RowSink,
{
    while let Some(row) = source.next_row().context("Failed to read input row")? {
        expander
            .add(&row)
            .context("Failed to write pivoted rows")?;
    }
    expander.finish().context("Failed to flush output")?;
    expander.close();
    Ok(())
}

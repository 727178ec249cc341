//! Error types for the pivot transform.
//!
//! Configuration and schema failures are fatal and surface before any row is
//! processed. Coercion failures are recoverable per output row: the expander
//! skips the offending expansion and keeps going. Resource failures (source
//! reads, sink writes) are fatal and propagate to the host.

use crate::types::ColumnType;
use thiserror::Error;

/// Configuration failed to decode into the recognized shape.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed pivot configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A column list violates the schema invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column name must not be empty (index {index})")]
    EmptyName { index: usize },
    #[error("duplicate column name `{name}`")]
    DuplicateName { name: String },
    #[error("column `{name}` has index {index}, expected {expected}")]
    IndexMismatch {
        name: String,
        index: usize,
        expected: usize,
    },
}

/// A cell value could not be read as the requested column type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot read {found} value as {expected}")]
pub struct CoerceError {
    pub expected: ColumnType,
    pub found: &'static str,
}

/// A row source or sink failed to read, write, or release.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("row transport I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("row encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("malformed input row: {0}")]
    Decode(String),
    #[error("row sink is closed")]
    Closed,
}

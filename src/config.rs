//! Pivot configuration decoding.
//!
//! The host pipeline owns the raw configuration object; this module decodes
//! the keys the transform recognizes and applies defaults. Unknown keys are
//! ignored (the host's config carries entries for other pipeline stages).

use crate::error::ConfigError;
use crate::types::ColumnType;
use serde::Deserialize;
use tracing::warn;

/// Name and type for a generated output column (key or value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumnSpec {
    pub name: String,
    pub data_type: ColumnType,
}

/// Decoded transform configuration.
///
/// Input columns named in `common_columns` are copied into every output row;
/// all other input columns expand into key/value rows shaped by `key` and
/// `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotConfig {
    pub common_columns: Vec<String>,
    pub key: OutputColumnSpec,
    pub value: OutputColumnSpec,
}

impl Default for PivotConfig {
    fn default() -> Self {
        PivotConfig {
            common_columns: Vec::new(),
            key: OutputColumnSpec {
                name: "key".to_string(),
                data_type: ColumnType::String,
            },
            value: OutputColumnSpec {
                name: "value".to_string(),
                data_type: ColumnType::String,
            },
        }
    }
}

#[derive(Deserialize)]
struct RawColumnSpec {
    name: Option<String>,
    #[serde(rename = "type", default)]
    data_type: ColumnType,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    common_columns: Vec<String>,
    key_config: Option<RawColumnSpec>,
    value_config: Option<RawColumnSpec>,
    // Legacy flat form, always string-typed.
    key_key_name: Option<String>,
    value_key_name: Option<String>,
}

/// Decode a host configuration object into a [`PivotConfig`].
///
/// Recognized keys: `common_columns` (default `[]`), `key_config` /
/// `value_config` (`{name, type}`, defaulting to `key`/`value` of type
/// `string`), and the deprecated flat `key_key_name` / `value_key_name`
/// still accepted for old configs. The nested form wins when both appear.
pub fn decode_config(config: &serde_json::Value) -> Result<PivotConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_value(config.clone())?;

    if raw.key_key_name.is_some() || raw.value_key_name.is_some() {
        warn!("key_key_name/value_key_name are deprecated; use key_config/value_config");
    }

    Ok(PivotConfig {
        common_columns: raw.common_columns,
        key: resolve_spec(raw.key_config, raw.key_key_name, "key"),
        value: resolve_spec(raw.value_config, raw.value_key_name, "value"),
    })
}

fn resolve_spec(
    nested: Option<RawColumnSpec>,
    legacy_name: Option<String>,
    default_name: &str,
) -> OutputColumnSpec {
    match (nested, legacy_name) {
        (Some(spec), _) => OutputColumnSpec {
            name: spec.name.unwrap_or_else(|| default_name.to_string()),
            data_type: spec.data_type,
        },
        (None, Some(name)) => OutputColumnSpec {
            name,
            data_type: ColumnType::String,
        },
        (None, None) => OutputColumnSpec {
            name: default_name.to_string(),
            data_type: ColumnType::String,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = decode_config(&json!({"type": "pivot"})).unwrap();
        assert!(config.common_columns.is_empty());
        assert_eq!(config.key.name, "key");
        assert_eq!(config.key.data_type, ColumnType::String);
        assert_eq!(config.value.name, "value");
        assert_eq!(config.value.data_type, ColumnType::String);
        assert_eq!(config, PivotConfig::default());
    }

    #[test]
    fn test_nested_form() {
        let config = decode_config(&json!({
            "common_columns": ["user_id"],
            "key_config": {"name": "custom_key", "type": "string"},
            "value_config": {"name": "custom_value", "type": "integer64"},
        }))
        .unwrap();

        assert_eq!(config.common_columns, vec!["user_id"]);
        assert_eq!(config.key.name, "custom_key");
        assert_eq!(config.value.name, "custom_value");
        assert_eq!(config.value.data_type, ColumnType::Integer64);
    }

    #[test]
    fn test_nested_form_partial_defaults() {
        // name defaults per slot, type defaults to string
        let config = decode_config(&json!({
            "value_config": {"type": "float64"},
            "key_config": {"name": "metric"},
        }))
        .unwrap();

        assert_eq!(config.value.name, "value");
        assert_eq!(config.value.data_type, ColumnType::Float64);
        assert_eq!(config.key.name, "metric");
        assert_eq!(config.key.data_type, ColumnType::String);
    }

    #[test]
    fn test_legacy_flat_form() {
        let config = decode_config(&json!({
            "key_key_name": "k",
            "value_key_name": "v",
        }))
        .unwrap();

        assert_eq!(config.key.name, "k");
        assert_eq!(config.key.data_type, ColumnType::String);
        assert_eq!(config.value.name, "v");
        assert_eq!(config.value.data_type, ColumnType::String);
    }

    #[test]
    fn test_nested_wins_over_legacy() {
        let config = decode_config(&json!({
            "key_key_name": "old",
            "key_config": {"name": "new"},
        }))
        .unwrap();

        assert_eq!(config.key.name, "new");
    }

    #[test]
    fn test_invalid_type_enum_is_fatal() {
        let result = decode_config(&json!({
            "value_config": {"name": "v", "type": "long"},
        }));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_shape_is_fatal() {
        let result = decode_config(&json!({"common_columns": "user_id"}));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

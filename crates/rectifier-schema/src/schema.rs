//! # Configuration Schema
//!
//! The JSON Schema describing an autoscaling configuration document,
//! kept as data. [`crate::validate`] implements these rules by hand; the
//! constant is published for editors and tooling and can be compiled with
//! the `jsonschema` crate via [`build_schema_validator`].

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::ConfigError;

/// Raw schema text. The `^(?!mode).*$` pattern needs a regex engine with
/// look-around support.
pub const CONFIG_SCHEMA: &str = r#"{
  "type": "object",
  "patternProperties": {
    ".*": {
      "type": "object",
      "patternProperties": {
        "^(?!mode).*$": {
          "type": "object",
          "properties": {
            "intervals": {"type": "array", "items": {"type": "number"}},
            "workers": {"type": "array", "items": {"type": "number"}},
            "cooldown": {"type": "number"},
            "consumers_formation_name": {"type": "string"}
          },
          "required": ["intervals", "workers", "cooldown", "consumers_formation_name"],
          "additionalProperties": false
        },
        "^mode$": {"type": "string", "enum": ["scale", "noop", "kill"]}
      }
    }
  },
  "additionalProperties": false
}"#;

/// Fields every scale policy must carry, in schema order.
pub const REQUIRED_POLICY_FIELDS: [&str; 4] =
    ["intervals", "workers", "cooldown", "consumers_formation_name"];

static SCHEMA: OnceLock<Result<Value, String>> = OnceLock::new();

/// The parsed schema, shared for the life of the process.
///
/// # Errors
///
/// Returns `ConfigError::SchemaBuild` if [`CONFIG_SCHEMA`] is not valid JSON.
pub fn config_schema() -> Result<&'static Value, ConfigError> {
    SCHEMA
        .get_or_init(|| serde_json::from_str(CONFIG_SCHEMA).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|reason| ConfigError::SchemaBuild {
            reason: format!("schema constant is not valid JSON: {reason}"),
        })
}

/// Compile the schema with the `jsonschema` engine (Draft 2020-12).
///
/// # Errors
///
/// Returns `ConfigError::SchemaBuild` if the engine rejects the schema.
pub fn build_schema_validator() -> Result<Validator, ConfigError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.build(config_schema()?)
        .map_err(|e| ConfigError::SchemaBuild {
            reason: e.to_string(),
        })
}

//! # Document Loading
//!
//! Reads configuration documents as JSON or YAML and converts them into
//! the `serde_json::Value` tree the validator works on. The format of a
//! file is chosen by its extension: `.yaml`/`.yml` for YAML, anything else
//! is read as JSON.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ConfigError;

/// Label used in errors for documents that did not come from a file.
pub const INLINE_DOCUMENT: &str = "<inline>";

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text.
    #[default]
    Json,
    /// YAML text, restricted to its JSON-compatible subset.
    Yaml,
}

impl DocumentFormat {
    /// Format implied by a file's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        })
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown document format: {other:?}")),
        }
    }
}

/// Parse document text.
///
/// # Errors
///
/// Returns `ConfigError::DocumentLoad` if the text is not valid in `format`.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, ConfigError> {
    parse_named(text, format, INLINE_DOCUMENT)
}

/// Read and parse a document file.
///
/// # Errors
///
/// Returns `ConfigError::DocumentLoad` if the file cannot be read or parsed.
pub fn read_document(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;
    parse_named(&content, DocumentFormat::from_path(path), &path.display().to_string())
}

fn parse_named(text: &str, format: DocumentFormat, name: &str) -> Result<Value, ConfigError> {
    let load_error = |reason: String| ConfigError::DocumentLoad {
        path: name.to_string(),
        reason,
    };

    match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|e| load_error(format!("invalid JSON: {e}")))
        }
        DocumentFormat::Yaml => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(text)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value)
                .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Scalar map keys are stringified; tags are dropped.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("c.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("c.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("c.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Json);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("yaml".parse::<DocumentFormat>().unwrap(), DocumentFormat::Yaml);
        assert_eq!("json".parse::<DocumentFormat>().unwrap(), DocumentFormat::Json);
        assert!("toml".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_parse_json() {
        let value = parse_document(r#"{"app": {"mode": "noop"}}"#, DocumentFormat::Json).unwrap();
        assert_eq!(value, json!({"app": {"mode": "noop"}}));
    }

    #[test]
    fn test_parse_yaml_matches_json() {
        let yaml = r#"
rectifier:
  mode: scale
  q1:
    intervals: [0, 10, 20]
    workers: [1, 5, 50]
    cooldown: 30.5
    consumers_formation_name: q1w
"#;
        let value = parse_document(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(
            value,
            json!({"rectifier": {
                "mode": "scale",
                "q1": {
                    "intervals": [0, 10, 20],
                    "workers": [1, 5, 50],
                    "cooldown": 30.5,
                    "consumers_formation_name": "q1w"
                }
            }})
        );
    }

    #[test]
    fn test_yaml_scalar_keys_stringified() {
        let value = parse_document("1: {true: x}", DocumentFormat::Yaml).unwrap();
        assert_eq!(value, json!({"1": {"true": "x"}}));
    }

    #[test]
    fn test_yaml_sequence_key_rejected() {
        let err = parse_document("? [a, b]\n: 1\n", DocumentFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported YAML map key"), "{err}");
    }

    #[test]
    fn test_invalid_json_is_load_error() {
        let err = parse_document("{not json", DocumentFormat::Json).unwrap_err();
        match err {
            ConfigError::DocumentLoad { path, reason } => {
                assert_eq!(path, INLINE_DOCUMENT);
                assert!(reason.starts_with("invalid JSON"));
            }
            other => panic!("Expected DocumentLoad, got: {other}"),
        }
    }

    #[test]
    fn test_read_document_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "app:\n  mode: kill").unwrap();
        let value = read_document(file.path()).unwrap();
        assert_eq!(value, json!({"app": {"mode": "kill"}}));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, ConfigError::DocumentLoad { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}

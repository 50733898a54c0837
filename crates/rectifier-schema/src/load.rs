//! # Configuration Loading
//!
//! Turns a document into an [`AutoscaleConfig`]:
//!
//! 1. validate the document's shape ([`crate::validate`]),
//! 2. apply the scale-policy rules (see [`rectifier_core::check_policy`])
//!    to every service,
//! 3. build the typed configuration.
//!
//! Both checking stages are exhaustive. A rejected document is reported
//! as [`ConfigError::Invalid`] carrying every violation; the caller decides
//! whether to keep its previous configuration.

use std::collections::BTreeMap;
use std::path::Path;

use rectifier_core::{AutoscaleConfig, GroupConfig, Mode, RawNumber, ScalePolicy, MODE_KEY};
use serde_json::Value;

use crate::document::{parse_document, read_document, DocumentFormat, INLINE_DOCUMENT};
use crate::error::ConfigError;
use crate::validate::{validate, InstancePath, ValidationViolations, Violation, ViolationKind};

/// Load a parsed document.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` with every schema and policy violation.
pub fn load(document: &Value) -> Result<AutoscaleConfig, ConfigError> {
    load_from(document, INLINE_DOCUMENT)
}

/// Parse and load document text.
///
/// # Errors
///
/// Returns `ConfigError::DocumentLoad` for unparseable text, otherwise as [`load()`].
pub fn load_str(text: &str, format: DocumentFormat) -> Result<AutoscaleConfig, ConfigError> {
    load(&parse_document(text, format)?)
}

/// Read and load a document file; the format follows the file extension.
///
/// # Errors
///
/// Returns `ConfigError::DocumentLoad` for unreadable or unparseable files,
/// otherwise as [`load()`].
pub fn load_file(path: &Path) -> Result<AutoscaleConfig, ConfigError> {
    let document = read_document(path)?;
    load_from(&document, &path.display().to_string())
}

fn load_from(document: &Value, source: &str) -> Result<AutoscaleConfig, ConfigError> {
    tracing::debug!(source, "loading autoscaling configuration");

    validate(document).map_err(|v| reject(v, source))?;

    let mut violations = Vec::new();
    let mut groups = BTreeMap::new();

    for (group_name, services) in objects(document) {
        let group_path = InstancePath::root().key(group_name);
        let mut mode = Mode::default();
        let mut policies = BTreeMap::new();

        for (service_name, value) in objects(services) {
            if service_name == MODE_KEY {
                mode = value
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default();
                continue;
            }

            let fields = value.as_object();
            let field = |name: &str| fields.and_then(|f| f.get(name));
            let built = ScalePolicy::new(
                service_name.as_str(),
                &numbers(field("intervals")),
                &numbers(field("workers")),
                field("cooldown").and_then(Value::as_f64).unwrap_or_default(),
                field("consumers_formation_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
            );

            match built {
                Ok(policy) => {
                    policies.insert(service_name.clone(), policy);
                }
                Err(failures) => {
                    let path = group_path.key(service_name);
                    violations.extend(failures.into_iter().map(|failure| Violation {
                        path: path.clone(),
                        kind: ViolationKind::Policy(failure),
                        value: value.clone(),
                    }));
                }
            }
        }

        groups.insert(group_name.clone(), GroupConfig::new(mode, policies));
    }

    ValidationViolations::new(violations)
        .into_result()
        .map_err(|v| reject(v, source))?;

    let config = AutoscaleConfig::new(groups);
    tracing::info!(
        source,
        groups = config.groups().len(),
        services = config.service_count(),
        "loaded autoscaling configuration"
    );
    Ok(config)
}

fn reject(violations: ValidationViolations, source: &str) -> ConfigError {
    tracing::warn!(
        source,
        violations = violations.len(),
        "failed to validate configuration"
    );
    ConfigError::Invalid(violations)
}

/// Members of an object; empty for anything else.
fn objects(value: &Value) -> impl Iterator<Item = (&String, &Value)> {
    value.as_object().into_iter().flat_map(|map| map.iter())
}

/// Array entries as document numbers, unsigned integers kept exact.
fn numbers(value: Option<&Value>) -> Vec<RawNumber> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.as_u64()
                        .map(RawNumber::Whole)
                        .or_else(|| item.as_f64().map(RawNumber::Float))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rectifier_core::PolicyViolation;
    use serde_json::json;

    fn queue(intervals: Value, workers: Value, cooldown: Value, formation: &str) -> Value {
        json!({
            "intervals": intervals,
            "workers": workers,
            "cooldown": cooldown,
            "consumers_formation_name": formation,
        })
    }

    #[test]
    fn test_load_builds_typed_config() {
        let config = load(&json!({
            "rectifier": {
                "q1": queue(json!([0, 10, 20, 30]), json!([1, 5, 50, 500]), json!(30), "q1w"),
                "q2": queue(json!([0, 10, 20, 40]), json!([1, 5, 50, 101]), json!(35), "q2w"),
            },
            "rectifier2": {
                "mode": "noop",
                "q3": queue(json!([0, 10, 11, 12]), json!([1, 5, 6, 7]), json!(12), "q3w"),
            }
        }))
        .unwrap();

        assert_eq!(config.groups().len(), 2);
        assert_eq!(config.service_count(), 3);

        let rectifier = config.group("rectifier").unwrap();
        assert_eq!(rectifier.mode(), Mode::Scale);
        let q1 = rectifier.service("q1").unwrap();
        assert_eq!(q1.queue_name(), "q1");
        assert_eq!(q1.intervals(), &[0, 10, 20, 30]);
        assert_eq!(q1.workers(), &[1, 5, 50, 500]);
        assert_eq!(q1.cooldown().as_secs(), 30);
        assert_eq!(q1.consumers_formation_name(), "q1w");

        let rectifier2 = config.group("rectifier2").unwrap();
        assert_eq!(rectifier2.mode(), Mode::Noop);
        assert!(rectifier2.service(MODE_KEY).is_none());
        assert_eq!(rectifier2.service("q3").unwrap().cooldown().as_secs(), 12);
    }

    #[test]
    fn test_load_schema_violation_short_circuits_policy_checks() {
        let err = load(&json!({"g": {"s": {"intervals": [5]}}})).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations
            .iter()
            .all(|v| matches!(v.kind, ViolationKind::MissingRequiredField(_))));
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_load_reports_policy_violations_across_services() {
        let err = load(&json!({
            "a": {"s1": queue(json!([1, 10]), json!([1, 2]), json!(0), "w")},
            "b": {"s2": queue(json!([0, 10]), json!([1]), json!(-3), "w")},
        }))
        .unwrap_err();
        let violations = err.violations().unwrap().violations();

        let found: Vec<(String, &ViolationKind)> =
            violations.iter().map(|v| (v.path.to_string(), &v.kind)).collect();
        assert_eq!(
            found,
            vec![
                (
                    "/a/s1".to_string(),
                    &ViolationKind::Policy(PolicyViolation::FirstIntervalNotZero(RawNumber::Whole(1)))
                ),
                (
                    "/b/s2".to_string(),
                    &ViolationKind::Policy(PolicyViolation::LengthMismatch {
                        intervals: 2,
                        workers: 1
                    })
                ),
                (
                    "/b/s2".to_string(),
                    &ViolationKind::Policy(PolicyViolation::NegativeCooldown(-3.0))
                ),
            ]
        );
    }

    #[test]
    fn test_load_keeps_integers_past_float_precision() {
        let config = load(&json!({
            "app": {"q": queue(json!([0, 9_007_199_254_740_993u64]), json!([1, 2]), json!(0), "w")}
        }))
        .unwrap();
        let q = config.group("app").unwrap().service("q").unwrap();
        assert_eq!(q.intervals(), &[0, 9_007_199_254_740_993]);
        assert_eq!(q.target_workers(9_007_199_254_740_992), 1);
    }

    #[test]
    fn test_load_reports_counts_past_u64() {
        let err = load(&json!({
            "app": {"q": queue(json!([0, 1]), json!([1, 1e300]), json!(0), "w")}
        }))
        .unwrap_err();
        let kinds: Vec<&ViolationKind> = err.violations().unwrap().iter().map(|v| &v.kind).collect();
        assert_eq!(
            kinds,
            vec![&ViolationKind::Policy(PolicyViolation::OutOfRange {
                field: "workers",
                value: 1e300
            })]
        );
    }

    #[test]
    fn test_load_empty_document() {
        let config = load(&json!({})).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_mode_only_group_loads() {
        let config = load(&json!({"app": {"mode": "kill"}})).unwrap();
        let app = config.group("app").unwrap();
        assert_eq!(app.mode(), Mode::Kill);
        assert!(app.services().is_empty());
    }

    #[test]
    fn test_load_str_yaml() {
        let config = load_str(
            "app:\n  q:\n    intervals: [0, 100]\n    workers: [1, 3]\n    cooldown: 60\n    consumers_formation_name: worker\n",
            DocumentFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.group("app").unwrap().desired_workers("q", 150), Some(3));
    }

    #[test]
    fn test_load_str_unparseable() {
        let err = load_str("app: [", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DocumentLoad { .. }));
        assert!(err.violations().is_none());
    }

    #[test]
    fn test_loaded_config_serializes_back_to_valid_document() {
        let document = json!({
            "app": {
                "mode": "scale",
                "q": queue(json!([0, 5]), json!([2, 4]), json!(10), "w"),
            }
        });
        let config = load(&document).unwrap();
        let round = serde_json::to_value(&config).unwrap();
        validate(&round).unwrap();
        assert_eq!(load(&round).unwrap(), config);
    }
}

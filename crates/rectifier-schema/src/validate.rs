//! # Configuration Validation
//!
//! Checks a parsed document against the configuration schema
//! ([`crate::schema::CONFIG_SCHEMA`]) and reports every violation found.
//!
//! ## Rules
//!
//! 1. The root is an object of groups.
//! 2. Every group is an object of services.
//! 3. The key `mode` holds one of `scale`, `noop`, `kill`; every other key
//!    is a scale policy.
//! 4. A scale policy is a closed object with exactly `intervals` and
//!    `workers` (arrays of numbers), `cooldown` (number) and
//!    `consumers_formation_name` (string).
//!
//! Validation never stops at the first problem. Violations are reported
//! in document order, and a bad value is not descended into: a group that
//! is not an object yields one `WrongType`, not one per service.
//!
//! Group and service names are unconstrained.

use std::fmt;

use rectifier_core::{Mode, PolicyViolation, MODE_KEY};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::REQUIRED_POLICY_FIELDS;

/// Runtime type of a JSON value, as named by JSON Schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any JSON number, integer or not.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl JsonType {
    /// The type of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Lowercase JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step from a parent value to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

/// Location of a value inside a document, from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path of object keys, e.g. `InstancePath::keys(["groupA", "mode"])`.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }

    /// This path extended by an object key.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// This path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns true for the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments from the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for InstancePath {
    /// JSON Pointer (RFC 6901) form; the root is the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => {
                    write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?
                }
                PathSegment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

/// The rule a value broke.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// The value's type differs from the one the schema requires here.
    #[error("expected {expected}, found {found}")]
    WrongType {
        /// Type required by the schema.
        expected: JsonType,
        /// Type of the value in the document.
        found: JsonType,
    },

    /// A scale policy lacks a required field.
    #[error("\"{0}\" is a required property")]
    MissingRequiredField(&'static str),

    /// An object holds a field the closed schema does not allow.
    #[error("additional property \"{0}\" is not allowed")]
    DisallowedField(String),

    /// A string outside the allowed enumeration.
    #[error("value is not one of {}", quote_all(.allowed))]
    InvalidEnumValue {
        /// The accepted values.
        allowed: &'static [&'static str],
    },

    /// A policy with a valid shape but unusable numbers. Only produced by
    /// [`crate::load()`].
    #[error(transparent)]
    Policy(PolicyViolation),
}

impl ViolationKind {
    /// Stable snake_case rule name for machine-readable reports.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::WrongType { .. } => "wrong_type",
            Self::MissingRequiredField(_) => "missing_required_field",
            Self::DisallowedField(_) => "disallowed_field",
            Self::InvalidEnumValue { .. } => "invalid_enum_value",
            Self::Policy(_) => "policy",
        }
    }
}

fn quote_all(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Where the violation occurred. Missing and disallowed fields are
    /// reported at the object that should (not) contain them.
    pub path: InstancePath,
    /// The rule that was broken.
    pub kind: ViolationKind,
    /// The offending value: the value itself, the enclosing object for a
    /// missing field, or the extra field's value for a disallowed one.
    pub value: Value,
}

impl Violation {
    fn new(path: InstancePath, kind: ViolationKind, value: &Value) -> Self {
        Self {
            path,
            kind,
            value: value.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.kind)?;
        } else {
            write!(f, "{}: {}", self.path, self.kind)?;
        }
        if let ViolationKind::InvalidEnumValue { .. } = self.kind {
            write!(f, " (got {})", self.value)?;
        }
        Ok(())
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationViolations {}

/// Validate a configuration document.
///
/// Pure and deterministic: the same document always yields the same
/// result, and nothing is retained between calls.
///
/// # Errors
///
/// Returns every violation in the document, in document order.
pub fn validate(document: &Value) -> Result<(), ValidationViolations> {
    let mut violations = Vec::new();
    check_groups(document, &mut violations);
    ValidationViolations::new(violations).into_result()
}

fn check_groups(document: &Value, out: &mut Vec<Violation>) {
    let root = InstancePath::root();
    let Some(groups) = expect_object(document, &root, out) else {
        return;
    };
    for (group, services) in groups {
        check_services(services, &root.key(group), out);
    }
}

fn check_services(services: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    let Some(services) = expect_object(services, path, out) else {
        return;
    };
    for (name, value) in services {
        if name == MODE_KEY {
            check_mode(value, &path.key(name), out);
        } else {
            check_policy_shape(value, &path.key(name), out);
        }
    }
}

fn check_mode(value: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    match value {
        Value::String(s) if s.parse::<Mode>().is_err() => out.push(Violation::new(
            path.clone(),
            ViolationKind::InvalidEnumValue {
                allowed: &Mode::NAMES,
            },
            value,
        )),
        Value::String(_) => {}
        other => out.push(wrong_type(path, JsonType::String, other)),
    }
}

fn check_policy_shape(value: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    let Some(fields) = expect_object(value, path, out) else {
        return;
    };

    for field in REQUIRED_POLICY_FIELDS {
        if !fields.contains_key(field) {
            out.push(Violation::new(
                path.clone(),
                ViolationKind::MissingRequiredField(field),
                value,
            ));
        }
    }

    for (name, field) in fields {
        match name.as_str() {
            "intervals" | "workers" => check_number_array(field, &path.key(name), out),
            "cooldown" => {
                if !field.is_number() {
                    out.push(wrong_type(&path.key(name), JsonType::Number, field));
                }
            }
            "consumers_formation_name" => {
                if !field.is_string() {
                    out.push(wrong_type(&path.key(name), JsonType::String, field));
                }
            }
            _ => out.push(Violation::new(
                path.clone(),
                ViolationKind::DisallowedField(name.clone()),
                field,
            )),
        }
    }
}

fn check_number_array(value: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    let Value::Array(items) = value else {
        out.push(wrong_type(path, JsonType::Array, value));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !item.is_number() {
            out.push(wrong_type(&path.index(i), JsonType::Number, item));
        }
    }
}

fn expect_object<'v>(
    value: &'v Value,
    path: &InstancePath,
    out: &mut Vec<Violation>,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            out.push(wrong_type(path, JsonType::Object, other));
            None
        }
    }
}

fn wrong_type(path: &InstancePath, expected: JsonType, value: &Value) -> Violation {
    Violation::new(
        path.clone(),
        ViolationKind::WrongType {
            expected,
            found: JsonType::of(value),
        },
        value,
    )
}

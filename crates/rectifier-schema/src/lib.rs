//! # rectifier-schema — Configuration Schema & Validation
//!
//! Validates autoscaling configuration documents and loads them into the
//! typed configuration of `rectifier-core`.
//!
//! ## Validation (`validate`)
//!
//! [`validate()`] checks a parsed JSON value against the configuration
//! rules and returns every violation, each with its JSON Pointer path, the
//! rule broken, and the offending value. It never panics on malformed
//! input; a bad document is a returned value.
//!
//! ## Schema (`schema`)
//!
//! [`CONFIG_SCHEMA`] is the JSON Schema for the document, published for
//! editors and tooling. [`build_schema_validator`] compiles it with the
//! `jsonschema` crate.
//!
//! ## Loading (`load`, `document`)
//!
//! [`load()`], [`load_str`] and [`load_file`] read JSON or YAML, validate,
//! apply the scale-policy rules, and build an
//! [`AutoscaleConfig`](rectifier_core::AutoscaleConfig).
//!
//! ## Crate Policy
//!
//! - Depends only on `rectifier-core` internally.
//! - Validation is a trust boundary: nothing reaches the typed
//!   configuration without passing both checking stages.

pub mod document;
pub mod error;
pub mod load;
pub mod schema;
pub mod validate;

pub use document::{parse_document, read_document, DocumentFormat, INLINE_DOCUMENT};
pub use error::ConfigError;
pub use load::{load, load_file, load_str};
pub use schema::{build_schema_validator, config_schema, CONFIG_SCHEMA, REQUIRED_POLICY_FIELDS};
pub use validate::{
    validate, InstancePath, JsonType, PathSegment, ValidationViolations, Violation, ViolationKind,
};

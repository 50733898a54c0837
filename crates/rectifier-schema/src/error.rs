//! # Error Types
//!
//! `ConfigError` is the single error type of the loading path. A document
//! that parses but breaks the rules is `Invalid`; the other variants are
//! hard faults where no document could be examined at all.

use thiserror::Error;

use crate::validate::ValidationViolations;

/// Error loading an autoscaling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document was read but does not describe a usable configuration.
    #[error("configuration rejected:\n{0}")]
    Invalid(ValidationViolations),

    /// The document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path (or `<inline>`) of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The schema constant could not be compiled by the schema engine.
    #[error("schema build error: {reason}")]
    SchemaBuild {
        /// Reason reported by the engine.
        reason: String,
    },
}

impl ConfigError {
    /// The violations, when the document was rejected on its content.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::Invalid(violations) => Some(violations),
            _ => None,
        }
    }
}

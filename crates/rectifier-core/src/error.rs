//! # Error Types
//!
//! Errors raised while building typed configuration. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Policy errors are values, collected exhaustively by the constructor
//!   of [`ScalePolicy`](crate::ScalePolicy) and reported together.
//! - Each policy error carries the offending numbers so an operator can
//!   fix the document without re-reading it.

use thiserror::Error;

use crate::policy::RawNumber;

/// A semantic rule broken by a scale policy whose shape is otherwise valid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyViolation {
    /// `intervals` and `workers` must pair up one to one.
    #[error("the length of the intervals array ({intervals}) should match the length of the workers array ({workers})")]
    LengthMismatch {
        /// Number of interval thresholds.
        intervals: usize,
        /// Number of worker counts.
        workers: usize,
    },

    /// A policy without thresholds cannot select a worker count.
    #[error("the intervals array should not be empty")]
    EmptyIntervals,

    /// The lowest threshold must cover an empty queue.
    #[error("the first interval should start with 0, found {0}")]
    FirstIntervalNotZero(RawNumber),

    /// Message thresholds are counts.
    #[error("the entries in the message intervals should all be positive, found {0}")]
    NegativeInterval(f64),

    /// Worker counts are counts.
    #[error("the entries in the workers count array should all be positive, found {0}")]
    NegativeWorkers(f64),

    /// Cooldown is a duration in seconds.
    #[error("the cooldown should be positive, found {0}")]
    NegativeCooldown(f64),

    /// Thresholds are searched in ascending order.
    #[error("the intervals should be sorted in ascending order")]
    UnsortedIntervals,

    /// Interval thresholds and worker counts must be integral.
    #[error("{field} entries should be whole numbers, found {value}")]
    NotWholeNumber {
        /// `intervals` or `workers`.
        field: &'static str,
        /// The fractional entry.
        value: f64,
    },

    /// Counts are stored as `u64`.
    #[error("{field} entries should be at most {max}, found {value}", max = u64::MAX)]
    OutOfRange {
        /// `intervals` or `workers`.
        field: &'static str,
        /// The entry at or past 2^64.
        value: f64,
    },
}

/// Error parsing a [`Mode`](crate::Mode) from a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode {0:?}; expected one of scale, noop, kill")]
pub struct ModeParseError(pub String);

//! # rectifier-core — Foundational Types for Rectifier
//!
//! Domain types shared by every other crate in the workspace: the group
//! [`Mode`], the validated [`ScalePolicy`], and the typed
//! [`AutoscaleConfig`] built from a configuration document.
//!
//! ## Key Design Principles
//!
//! 1. **Checked construction.** A `ScalePolicy` only exists once its
//!    numbers satisfy the policy rules, so lookups on it cannot fail.
//!
//! 2. **Single `Mode` enum.** One definition of `scale | noop | kill`,
//!    matched exhaustively wherever a group's behaviour is decided.
//!
//! 3. **Errors are values.** Policy failures are collected, not raised one
//!    at a time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rectifier-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod mode;
pub mod policy;

// Re-export primary types for ergonomic imports.
pub use config::{AutoscaleConfig, GroupConfig, MODE_KEY};
pub use error::{ModeParseError, PolicyViolation};
pub use mode::{Mode, MODE_COUNT};
pub use policy::{check_policy, RawNumber, ScalePolicy};

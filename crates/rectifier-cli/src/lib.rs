//! # rectifier-cli — Rectifier Command-Line Interface
//!
//! A clap-based front end over `rectifier-schema`.
//!
//! ## Subcommands
//!
//! - `validate`: check configuration files, text or JSON report
//! - `schema`: print the configuration JSON Schema
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates and return an exit code.

pub mod schema;
pub mod validate;

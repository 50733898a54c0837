//! # Validate Subcommand
//!
//! Checks configuration files and prints every violation found.
//!
//! ## Exit codes
//!
//! - `0`: every file is valid,
//! - `1`: at least one file was rejected,
//! - `2`: at least one file could not be read or parsed.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use rectifier_schema::{load_file, read_document, validate, ConfigError, ValidationViolations};

/// Arguments for the `rectifier validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to check (`.json`, `.yaml` or `.yml`).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Check the document shape only, skipping the scale-policy rules.
    #[arg(long)]
    pub schema_only: bool,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file or violation.
    Text,
    /// A JSON array with one report per file.
    Json,
}

/// Result of checking one file.
#[derive(Debug)]
enum Outcome {
    Valid,
    Invalid(ValidationViolations),
    Unreadable(String),
}

impl Outcome {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Valid => 0,
            Self::Invalid(_) => 1,
            Self::Unreadable(_) => 2,
        }
    }
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    violations: Vec<ViolationReport>,
}

#[derive(Serialize)]
struct ViolationReport {
    path: String,
    rule: &'static str,
    message: String,
    value: Value,
}

/// Check every file in `args` and write the report to `out`.
///
/// Returns the process exit code.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let mut outcomes = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let outcome = check_file(file, args.schema_only);
        tracing::debug!(file = %file.display(), code = outcome.exit_code(), "checked file");
        outcomes.push((file.as_path(), outcome));
    }

    match args.format {
        OutputFormat::Text => write_text(&outcomes, out)?,
        OutputFormat::Json => write_json(&outcomes, out)?,
    }

    Ok(outcomes
        .iter()
        .map(|(_, outcome)| outcome.exit_code())
        .max()
        .unwrap_or(0))
}

fn check_file(path: &Path, schema_only: bool) -> Outcome {
    let result = if schema_only {
        read_document(path).and_then(|doc| validate(&doc).map_err(ConfigError::Invalid))
    } else {
        load_file(path).map(|_| ())
    };

    match result {
        Ok(()) => Outcome::Valid,
        Err(ConfigError::Invalid(violations)) => Outcome::Invalid(violations),
        Err(other) => Outcome::Unreadable(other.to_string()),
    }
}

fn write_text(outcomes: &[(&Path, Outcome)], out: &mut impl Write) -> Result<()> {
    for (file, outcome) in outcomes {
        let file = file.display();
        match outcome {
            Outcome::Valid => writeln!(out, "OK {file}")?,
            Outcome::Invalid(violations) => {
                for violation in violations {
                    writeln!(out, "{file}: {violation}")?;
                }
            }
            Outcome::Unreadable(reason) => writeln!(out, "{file}: error: {reason}")?,
        }
    }
    Ok(())
}

fn write_json(outcomes: &[(&Path, Outcome)], out: &mut impl Write) -> Result<()> {
    let reports: Vec<FileReport> = outcomes
        .iter()
        .map(|(file, outcome)| {
            let file = file.display().to_string();
            match outcome {
                Outcome::Valid => FileReport {
                    file,
                    status: "valid",
                    error: None,
                    violations: Vec::new(),
                },
                Outcome::Invalid(violations) => FileReport {
                    file,
                    status: "invalid",
                    error: None,
                    violations: violations
                        .iter()
                        .map(|v| ViolationReport {
                            path: v.path.to_string(),
                            rule: v.kind.rule(),
                            message: v.kind.to_string(),
                            value: v.value.clone(),
                        })
                        .collect(),
                },
                Outcome::Unreadable(reason) => FileReport {
                    file,
                    status: "error",
                    error: Some(reason.clone()),
                    violations: Vec::new(),
                },
            }
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &reports).context("failed to write JSON report")?;
    writeln!(out)?;
    Ok(())
}

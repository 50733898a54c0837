//! # Group Mode
//!
//! A group-wide switch that overrides normal scaling for every service in
//! the group. The string forms are part of the configuration contract and
//! must match the `enum` of the `mode` key in the schema.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModeParseError;

/// Behaviour of the autoscaler for a whole group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Scale services according to their policies.
    #[default]
    Scale,
    /// Leave worker counts untouched.
    Noop,
    /// Scale every consumer formation down to zero.
    Kill,
}

/// Number of modes. Used for compile-time assertions.
pub const MODE_COUNT: usize = 3;

impl Mode {
    /// All modes in schema order.
    pub const ALL: [Mode; MODE_COUNT] = [Mode::Scale, Mode::Noop, Mode::Kill];

    /// The string values accepted for the `mode` key, in schema order.
    pub const NAMES: [&'static str; MODE_COUNT] = ["scale", "noop", "kill"];

    /// Returns the lowercase identifier used in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Noop => "noop",
            Self::Kill => "kill",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeParseError;

    /// Case-sensitive, matching the schema enum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scale" => Ok(Self::Scale),
            "noop" => Ok(Self::Noop),
            "kill" => Ok(Self::Kill),
            other => Err(ModeParseError(other.to_string())),
        }
    }
}

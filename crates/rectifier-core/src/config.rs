//! # Typed Autoscaling Configuration
//!
//! The in-memory form of a configuration document once it has passed
//! schema validation and the policy checks:
//!
//! ```text
//! AutoscaleConfig ── group name ──▶ GroupConfig { mode, services }
//!                                        └── service name ──▶ ScalePolicy
//! ```
//!
//! Maps are ordered so iteration and serialization are deterministic.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::mode::Mode;
use crate::policy::ScalePolicy;

/// Key of the group-wide mode switch inside a service map.
pub const MODE_KEY: &str = "mode";

/// All services of one group and the mode that governs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupConfig {
    mode: Mode,
    services: BTreeMap<String, ScalePolicy>,
}

impl GroupConfig {
    /// Create a group from its mode and services.
    pub fn new(mode: Mode, services: BTreeMap<String, ScalePolicy>) -> Self {
        Self { mode, services }
    }

    /// The group's mode. Groups without a `mode` key scale.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Services keyed by queue name.
    pub fn services(&self) -> &BTreeMap<String, ScalePolicy> {
        &self.services
    }

    /// Look up one service.
    pub fn service(&self, name: &str) -> Option<&ScalePolicy> {
        self.services.get(name)
    }

    /// Worker count a service should run with, given its queue depth.
    ///
    /// `None` means the group is in [`Mode::Noop`] or the service is
    /// unknown; [`Mode::Kill`] always asks for zero workers.
    pub fn desired_workers(&self, service: &str, messages: u64) -> Option<u64> {
        let policy = self.services.get(service)?;
        match self.mode {
            Mode::Noop => None,
            Mode::Kill => Some(0),
            Mode::Scale => Some(policy.target_workers(messages)),
        }
    }
}

impl Serialize for GroupConfig {
    /// Serializes back to the document shape: `mode` next to the services.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.services.len() + 1))?;
        map.serialize_entry(MODE_KEY, &self.mode)?;
        for (name, policy) in &self.services {
            map.serialize_entry(name, policy)?;
        }
        map.end()
    }
}

/// The complete autoscaling configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AutoscaleConfig {
    groups: BTreeMap<String, GroupConfig>,
}

impl AutoscaleConfig {
    /// Create a configuration from its groups.
    pub fn new(groups: BTreeMap<String, GroupConfig>) -> Self {
        Self { groups }
    }

    /// Groups keyed by name.
    pub fn groups(&self) -> &BTreeMap<String, GroupConfig> {
        &self.groups
    }

    /// Look up one group.
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.get(name)
    }

    /// Returns true if no group is configured.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of services across all groups.
    pub fn service_count(&self) -> usize {
        self.groups.values().map(|g| g.services.len()).sum()
    }

    /// Every `(group, service, policy)` triple, in name order.
    pub fn policies(&self) -> impl Iterator<Item = (&str, &str, &ScalePolicy)> {
        self.groups.iter().flat_map(|(group, config)| {
            config
                .services
                .iter()
                .map(move |(service, policy)| (group.as_str(), service.as_str(), policy))
        })
    }
}

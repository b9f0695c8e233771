// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The contract an addon implements, and the template based implementation
//! most addons are built with.

pub mod factory;
pub mod registry;
pub mod scheme;
pub mod template;
pub mod values;

pub use factory::{AgentAddonFactory, TemplateAgentAddon};
pub use registry::AddonRegistry;
pub use scheme::Scheme;
pub use values::{build_context, Values};

use crate::error::{AddonError, Result};
use crate::types::work::FeedbackRule;
use crate::types::{ManagedCluster, ManagedClusterAddOn, ResourceIdentifier, StatusFeedbackResult};
use kube::api::DynamicObject;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// An addon the manager deploys to managed clusters.
pub trait AgentAddon: Send + Sync {
    /// Produce the manifests to deploy for `addon` on `cluster`
    fn manifests(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Vec<DynamicObject>>;

    fn options(&self) -> &AgentAddonOptions;
}

#[derive(Debug, Clone, Default)]
pub struct AgentAddonOptions {
    pub addon_name: String,
    pub registration: Option<RegistrationOption>,
    pub install_strategy: Option<InstallStrategy>,
    pub health_prober: Option<HealthProber>,
}

/// Which clusters get the addon, and where its agent goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStrategy {
    pub kind: InstallStrategyKind,
    pub install_namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategyKind {
    /// Addon instances are created by users
    Manual,
    /// An addon instance is created on every managed cluster
    All,
}

impl InstallStrategy {
    pub fn install_all(install_namespace: &str) -> Self {
        Self {
            kind: InstallStrategyKind::All,
            install_namespace: install_namespace.to_string(),
        }
    }
}

/// How the addon agent registers back to the hub. Opaque to the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationOption {
    pub csr_configurations: Vec<RegistrationConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    pub signer_name: String,
    pub subject: String,
}

#[derive(Debug, Clone, Default)]
pub struct HealthProber {
    pub prober_type: HealthProberType,
    pub work_prober: Option<WorkHealthProber>,
}

impl HealthProber {
    pub fn new(prober_type: HealthProberType) -> Self {
        Self {
            prober_type,
            work_prober: None,
        }
    }

    pub fn work(work_prober: Option<WorkHealthProber>) -> Self {
        Self {
            prober_type: HealthProberType::Work,
            work_prober,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HealthProberType {
    /// The agent updates a lease on the hub
    #[default]
    Lease,
    /// Availability is judged from ManifestWork feedback
    Work,
    /// Availability is not tracked by the manager
    None,
}

impl FromStr for HealthProberType {
    type Err = AddonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "Lease" => Ok(HealthProberType::Lease),
            "Work" => Ok(HealthProberType::Work),
            "None" => Ok(HealthProberType::None),
            other => Err(AddonError::InvalidProberType(other.to_string())),
        }
    }
}

/// Judges a resource's health from the feedback the work agent reported for it
pub type HealthCheckFn =
    Arc<dyn Fn(&ResourceIdentifier, &StatusFeedbackResult) -> anyhow::Result<()> + Send + Sync>;

#[derive(Clone)]
pub struct WorkHealthProber {
    pub probe_fields: Vec<ProbeField>,
    pub health_check: HealthCheckFn,
}

impl fmt::Debug for WorkHealthProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkHealthProber")
            .field("probe_fields", &self.probe_fields)
            .finish_non_exhaustive()
    }
}

/// A resource to probe, and the feedback rules that make the agent report on it
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeField {
    pub resource_identifier: ResourceIdentifier,
    pub probe_rules: Vec<FeedbackRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prober_type_from_str() {
        assert_eq!("Lease".parse::<HealthProberType>().unwrap(), HealthProberType::Lease);
        assert_eq!("".parse::<HealthProberType>().unwrap(), HealthProberType::Lease);
        assert_eq!("Work".parse::<HealthProberType>().unwrap(), HealthProberType::Work);
        assert_eq!("None".parse::<HealthProberType>().unwrap(), HealthProberType::None);
    }

    #[test]
    fn test_prober_type_unknown_is_error() {
        let err = "Heartbeat".parse::<HealthProberType>().unwrap_err();
        assert!(matches!(err, AddonError::InvalidProberType(t) if t == "Heartbeat"));
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::annotations;
use crate::types::conditions::Condition;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// One addon desired on one managed cluster. Lives in the cluster's namespace
/// and is named after the addon.
#[derive(
    CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema,
)]
#[kube(
    group = "addon.open-cluster-management.io",
    version = "v1alpha1",
    kind = "ManagedClusterAddOn"
)]
#[kube(namespaced)]
#[kube(status = "ManagedClusterAddOnStatus")]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterAddOnSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_namespace: Option<String>,
}

impl ManagedClusterAddOn {
    /// Name of the managed cluster this addon belongs to
    pub fn cluster_name(&self) -> String {
        self.namespace().unwrap_or_default()
    }

    /// Raw value of the template config override annotation, if set
    pub fn template_config(&self) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(annotations::TEMPLATE_CONFIG))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Install namespace requested on the addon itself
    pub fn install_namespace(&self) -> Option<&str> {
        self.spec
            .install_namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
    }

    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    pub fn health_check_mode(&self) -> Option<HealthCheckMode> {
        self.status
            .as_ref()
            .and_then(|s| s.health_check.as_ref())
            .and_then(|h| h.mode)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterAddOnStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<HealthCheckMode>,
}

/// How the availability of an addon is determined
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum HealthCheckMode {
    /// The addon agent keeps a lease updated on the hub
    Lease,
    /// Availability comes from another signal, such as work feedback
    Customized,
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::conditions::Condition;
use kube::{CustomResource, Resource};
use serde::{Deserialize, Serialize};

/// A cluster managed by the hub; addons are installed into its namespace.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cluster.open-cluster-management.io", version = "v1", kind = "ManagedCluster")]
#[kube(status = "ManagedClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    #[serde(default)]
    pub hub_accepts_client: bool,
}

impl ManagedCluster {
    /// Check if this cluster is being deleted
    pub fn is_deleting(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use k8s_openapi::chrono::Utc;
    use kube::api::ObjectMeta;

    fn make_cluster(name: &str, status: Option<ManagedClusterStatus>) -> ManagedCluster {
        ManagedCluster {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: ManagedClusterSpec {
                hub_accepts_client: true,
            },
            status,
        }
    }

    #[test]
    fn test_is_deleting() {
        let mut cluster = make_cluster("cluster1", None);
        assert!(!cluster.is_deleting());

        cluster.metadata.deletion_timestamp = Some(Time(Utc::now()));
        assert!(cluster.is_deleting());
    }
}

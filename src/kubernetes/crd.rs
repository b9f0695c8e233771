// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::{ManagedCluster, ManagedClusterAddOn, ManifestWork};
use kube::{core::GroupVersionKind, discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// The kinds the manager watches
pub fn required_kinds() -> Vec<GroupVersionKind> {
    vec![
        gvk::<ManagedCluster>(),
        gvk::<ManagedClusterAddOn>(),
        gvk::<ManifestWork>(),
    ]
}

/// Group, version and kind of a statically typed resource
pub fn gvk<K: Resource<DynamicType = ()>>() -> GroupVersionKind {
    GroupVersionKind::gvk(&K::group(&()), &K::version(&()), &K::kind(&()))
}

/// Wait until every CRD the manager watches is served by the API server.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_crds(client: &Client) -> Result<()> {
    let required = required_kinds();
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match missing_kinds(client, &required).await {
            Ok(missing) if missing.is_empty() => {
                info!("All required CRDs are available");
                return Ok(());
            }
            Ok(missing) => {
                let names: Vec<_> = missing
                    .iter()
                    .map(|k| format!("{}.{}/{}", k.kind, k.group, k.version))
                    .collect();
                info!(
                    "CRDs {} not yet available, waiting {} seconds...",
                    names.join(", "),
                    interval
                );
            }
            Err(e) => {
                warn!("Error checking for CRDs: {}, retrying in {} seconds...", e, interval);
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// The subset of `required` the API server does not serve yet
async fn missing_kinds(
    client: &Client,
    required: &[GroupVersionKind],
) -> Result<Vec<GroupVersionKind>> {
    let groups: Vec<&str> = required.iter().map(|k| k.group.as_str()).collect();
    let discovery = Discovery::new(client.clone()).filter(&groups).run().await?;

    Ok(required
        .iter()
        .filter(|k| !discovery.has_group(&k.group) || discovery.resolve_gvk(k).is_none())
        .cloned()
        .collect())
}

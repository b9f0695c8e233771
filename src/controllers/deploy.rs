// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deploy controller - renders each addon instance's manifests and keeps its
//! deploy ManifestWork in sync with them.

use crate::addon::AddonRegistry;
use crate::constants::labels;
use crate::controllers::retry::{catch_panic, RetryBackoff};
use crate::controllers::source::{deploy_work_source, EventSource};
use crate::error::{AddonError, Result};
use crate::kubernetes::{apply_work, build_deploy_work};
use crate::types::{ManagedCluster, ManagedClusterAddOn, ManifestWork};
use futures::StreamExt;
use kube::runtime::controller::{self, Action};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::Controller;
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const CONTROLLER_NAME: &str = "addon-deploy-controller";

pub struct AddonDeployController {
    client: Client,
    registry: Arc<AddonRegistry>,
    backoff: RetryBackoff,
}

impl AddonDeployController {
    pub fn new(client: Client, registry: Arc<AddonRegistry>, backoff: RetryBackoff) -> Self {
        Self {
            client,
            registry,
            backoff,
        }
    }

    /// A cluster change concerns every registered addon on it
    pub fn cluster_source(
        registry: Arc<AddonRegistry>,
    ) -> EventSource<ManagedCluster, ManagedClusterAddOn> {
        EventSource::new(
            "clusters",
            |_: &ManagedCluster| true,
            move |cluster: &ManagedCluster| {
                let mut names: Vec<_> = registry.names().collect();
                names.sort();
                names
                    .into_iter()
                    .map(|addon| ObjectRef::new(addon).within(&cluster.name_any()))
                    .collect()
            },
        )
    }

    pub async fn run(self, config: controller::Config, token: CancellationToken) {
        let addons: Api<ManagedClusterAddOn> = Api::all(self.client.clone());
        let clusters: Api<ManagedCluster> = Api::all(self.client.clone());
        let works: Api<ManifestWork> = Api::all(self.client.clone());
        let cluster_source = Self::cluster_source(Arc::clone(&self.registry));
        let work_source = deploy_work_source(Arc::clone(&self.registry));

        info!(
            "Starting {} watching {} and {}",
            CONTROLLER_NAME,
            cluster_source.name(),
            work_source.name()
        );
        Controller::new(addons, WatcherConfig::default())
            .watches(clusters, WatcherConfig::default(), cluster_source.into_mapper())
            .watches(
                works,
                WatcherConfig::default().labels(labels::ADDON_NAME),
                work_source.into_mapper(),
            )
            .with_config(config)
            .graceful_shutdown_on(token.cancelled_owned())
            .run(
                |addon, ctx| catch_panic(reconcile(addon, ctx)),
                error_policy,
                Arc::new(self),
            )
            .for_each(|res| async move {
                match res {
                    Ok((addon, _)) => debug!("Reconciled deploy work of addon: {}", addon),
                    Err(e) => warn!("Deploy reconciliation error: {}", e),
                }
            })
            .await;
        info!("{} stopped", CONTROLLER_NAME);
    }
}

#[instrument(
    skip(addon, ctx),
    fields(cluster = %addon.cluster_name(), addon = %addon.name_any())
)]
async fn reconcile(
    addon: Arc<ManagedClusterAddOn>,
    ctx: Arc<AddonDeployController>,
) -> Result<Action> {
    let Some(agent) = ctx.registry.get(&addon.name_any()) else {
        return Ok(Action::await_change());
    };
    if addon.meta().deletion_timestamp.is_some() {
        debug!("Addon is being deleted, skipping deploy");
        return Ok(Action::await_change());
    }

    let cluster_name = addon.cluster_name();
    let clusters: Api<ManagedCluster> = Api::all(ctx.client.clone());
    let Some(cluster) = clusters.get_opt(&cluster_name).await? else {
        debug!("Managed cluster not found, skipping deploy");
        return Ok(Action::await_change());
    };
    if cluster.is_deleting() {
        debug!("Managed cluster is being deleted, skipping deploy");
        return Ok(Action::await_change());
    }

    let manifests = agent.manifests(&cluster, &addon)?;
    let work = build_deploy_work(&addon, agent.options(), &manifests)?;

    let works: Api<ManifestWork> = Api::namespaced(ctx.client.clone(), &cluster_name);
    let existing = works.get_opt(&work.name_any()).await?;
    if existing.is_some_and(|current| is_up_to_date(&current, &work)) {
        debug!("Deploy work is up to date");
    } else {
        apply_work(&ctx.client, &work).await?;
    }

    ctx.backoff.forget(addon.as_ref());
    Ok(Action::await_change())
}

fn error_policy(
    addon: Arc<ManagedClusterAddOn>,
    error: &AddonError,
    ctx: Arc<AddonDeployController>,
) -> Action {
    error!(
        "Deploying addon {} to cluster {} failed: {}",
        addon.name_any(),
        addon.cluster_name(),
        error
    );
    ctx.backoff.requeue(addon.as_ref())
}

fn is_up_to_date(current: &ManifestWork, desired: &ManifestWork) -> bool {
    current.spec == desired.spec
        && current.labels().get(labels::ADDON_NAME) == desired.labels().get(labels::ADDON_NAME)
}

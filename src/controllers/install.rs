// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Install controller - creates addon instances on every managed cluster for
//! addons installed with [`InstallStrategyKind::All`].

use crate::addon::{AddonRegistry, InstallStrategyKind};
use crate::controllers::retry::{catch_panic, RetryBackoff};
use crate::controllers::source::EventSource;
use crate::error::{AddonError, Result};
use crate::types::{ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec};
use futures::StreamExt;
use kube::api::PostParams;
use kube::runtime::controller::{self, Action};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const CONTROLLER_NAME: &str = "addon-install-controller";

pub struct AddonInstallController {
    client: Client,
    registry: Arc<AddonRegistry>,
    backoff: RetryBackoff,
}

impl AddonInstallController {
    pub fn new(client: Client, registry: Arc<AddonRegistry>, backoff: RetryBackoff) -> Self {
        Self {
            client,
            registry,
            backoff,
        }
    }

    /// A removed addon instance is recreated on its cluster
    pub fn addon_source(
        registry: Arc<AddonRegistry>,
    ) -> EventSource<ManagedClusterAddOn, ManagedCluster> {
        EventSource::new(
            "addons",
            move |addon: &ManagedClusterAddOn| registry.contains(&addon.name_any()),
            |addon: &ManagedClusterAddOn| vec![ObjectRef::new(&addon.cluster_name())],
        )
    }

    pub async fn run(self, config: controller::Config, token: CancellationToken) {
        let clusters: Api<ManagedCluster> = Api::all(self.client.clone());
        let addons: Api<ManagedClusterAddOn> = Api::all(self.client.clone());
        let addon_source = Self::addon_source(Arc::clone(&self.registry));

        info!("Starting {} watching {}", CONTROLLER_NAME, addon_source.name());
        Controller::new(clusters, WatcherConfig::default())
            .watches(addons, WatcherConfig::default(), addon_source.into_mapper())
            .with_config(config)
            .graceful_shutdown_on(token.cancelled_owned())
            .run(
                |cluster, ctx| catch_panic(reconcile(cluster, ctx)),
                error_policy,
                Arc::new(self),
            )
            .for_each(|res| async move {
                match res {
                    Ok((cluster, _)) => debug!("Reconciled addon installs on: {}", cluster),
                    Err(e) => warn!("Install reconciliation error: {}", e),
                }
            })
            .await;
        info!("{} stopped", CONTROLLER_NAME);
    }

    /// Addons to install on every cluster, with their install namespace
    fn install_all(&self) -> Vec<(&str, &str)> {
        let mut installs: Vec<_> = self
            .registry
            .iter()
            .filter_map(|agent| {
                let options = agent.options();
                options
                    .install_strategy
                    .as_ref()
                    .filter(|s| s.kind == InstallStrategyKind::All)
                    .map(|s| (options.addon_name.as_str(), s.install_namespace.as_str()))
            })
            .collect();
        installs.sort();
        installs
    }

    #[instrument(skip(self, install_namespace))]
    async fn ensure_addon(
        &self,
        cluster: &str,
        addon_name: &str,
        install_namespace: &str,
    ) -> Result<()> {
        let api: Api<ManagedClusterAddOn> = Api::namespaced(self.client.clone(), cluster);
        if api.get_opt(addon_name).await?.is_some() {
            return Ok(());
        }

        let mut addon = ManagedClusterAddOn::new(
            addon_name,
            ManagedClusterAddOnSpec {
                install_namespace: Some(install_namespace.to_string()),
            },
        );
        addon.metadata.namespace = Some(cluster.to_string());

        match api.create(&PostParams::default(), &addon).await {
            Ok(_) => {
                info!("Created addon {} on cluster {}", addon_name, cluster);
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 409 => {
                debug!("Addon {} already exists on cluster {}", addon_name, cluster);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[instrument(skip(cluster, ctx), fields(cluster = %cluster.name_any()))]
async fn reconcile(
    cluster: Arc<ManagedCluster>,
    ctx: Arc<AddonInstallController>,
) -> Result<Action> {
    if cluster.is_deleting() {
        debug!("Managed cluster is being deleted, skipping install");
        return Ok(Action::await_change());
    }

    let name = cluster.name_any();
    for (addon_name, install_namespace) in ctx.install_all() {
        ctx.ensure_addon(&name, addon_name, install_namespace).await?;
    }

    ctx.backoff.forget(cluster.as_ref());
    Ok(Action::await_change())
}

fn error_policy(
    cluster: Arc<ManagedCluster>,
    error: &AddonError,
    ctx: Arc<AddonInstallController>,
) -> Action {
    error!("Installing addons on cluster {} failed: {}", cluster.name_any(), error);
    ctx.backoff.requeue(cluster.as_ref())
}

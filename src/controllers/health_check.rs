// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Health check controller - keeps the health check mode and the Available
//! condition of every registered addon up to date.

use crate::addon::{AddonRegistry, HealthProber, HealthProberType, WorkHealthProber};
use crate::constants::conditions::{reasons, AVAILABLE};
use crate::constants::{deploy_work_name, labels};
use crate::controllers::retry::{catch_panic, RetryBackoff};
use crate::controllers::source::deploy_work_source;
use crate::error::{AddonError, Result};
use crate::kubernetes::{patch_addon_conditions, update_health_check_mode};
use crate::types::conditions::set_condition;
use crate::types::{Condition, ConditionStatus, HealthCheckMode, ManagedClusterAddOn, ManifestWork};
use futures::StreamExt;
use kube::runtime::controller::{self, Action};
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const CONTROLLER_NAME: &str = "addon-healthcheck-controller";

pub struct AddonHealthCheckController {
    client: Client,
    registry: Arc<AddonRegistry>,
    backoff: RetryBackoff,
}

impl AddonHealthCheckController {
    pub fn new(client: Client, registry: Arc<AddonRegistry>, backoff: RetryBackoff) -> Self {
        Self {
            client,
            registry,
            backoff,
        }
    }

    pub async fn run(self, config: controller::Config, token: CancellationToken) {
        let addons: Api<ManagedClusterAddOn> = Api::all(self.client.clone());
        let works: Api<ManifestWork> = Api::all(self.client.clone());
        let work_source = deploy_work_source(Arc::clone(&self.registry));

        info!("Starting {} watching {}", CONTROLLER_NAME, work_source.name());
        Controller::new(addons, WatcherConfig::default())
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
                    Ok((addon, _)) => debug!("Checked health of addon: {}", addon),
                    Err(e) => warn!("Health check reconciliation error: {}", e),
                }
            })
            .await;
        info!("{} stopped", CONTROLLER_NAME);
    }

    async fn sync_addon(&self, addon: &ManagedClusterAddOn, prober: &HealthProber) -> Result<()> {
        let mode = expected_health_check_mode(prober);

        let mut addon = addon.clone();
        if addon.health_check_mode() != Some(mode) {
            match update_health_check_mode(&self.client, &addon, mode).await? {
                Some(stored) => addon = stored,
                None => return Ok(()),
            }
        }

        if prober.prober_type != HealthProberType::Work {
            return Ok(());
        }

        let works: Api<ManifestWork> = Api::namespaced(self.client.clone(), &addon.cluster_name());
        let work = works.get_opt(&deploy_work_name(&addon.name_any())).await?;

        let mut condition = evaluate_availability(work.as_ref(), prober.work_prober.as_ref());
        condition.observed_generation = addon.metadata.generation;
        debug!(reason = %condition.reason, status = %condition.status, "Evaluated availability");

        let mut conditions = addon.conditions().to_vec();
        set_condition(&mut conditions, condition);
        patch_addon_conditions(&self.client, &addon, &conditions).await?;
        Ok(())
    }
}

#[instrument(skip(addon, ctx), fields(cluster = %addon.cluster_name(), addon = %addon.name_any()))]
async fn reconcile(
    addon: Arc<ManagedClusterAddOn>,
    ctx: Arc<AddonHealthCheckController>,
) -> Result<Action> {
    let Some(agent) = ctx.registry.get(&addon.name_any()) else {
        return Ok(Action::await_change());
    };
    let Some(prober) = agent.options().health_prober.as_ref() else {
        return Ok(Action::await_change());
    };

    ctx.sync_addon(&addon, prober).await?;
    ctx.backoff.forget(addon.as_ref());
    Ok(Action::await_change())
}

fn error_policy(
    addon: Arc<ManagedClusterAddOn>,
    error: &AddonError,
    ctx: Arc<AddonHealthCheckController>,
) -> Action {
    error!(
        "Health check of addon {} on cluster {} failed: {}",
        addon.name_any(),
        addon.cluster_name(),
        error
    );
    ctx.backoff.requeue(addon.as_ref())
}

/// The health check mode an addon with `prober` must advertise
pub fn expected_health_check_mode(prober: &HealthProber) -> HealthCheckMode {
    match prober.prober_type {
        HealthProberType::Work | HealthProberType::None => HealthCheckMode::Customized,
        HealthProberType::Lease => HealthCheckMode::Lease,
    }
}

/// Derive the Available condition from the addon's deploy work.
///
/// Probe fields are checked in order and the first one without feedback, or
/// whose health check fails, decides the outcome.
pub fn evaluate_availability(
    work: Option<&ManifestWork>,
    work_prober: Option<&WorkHealthProber>,
) -> Condition {
    let Some(work) = work else {
        return available(
            ConditionStatus::Unknown,
            reasons::WORK_NOT_FOUND,
            "Work for addon is not found",
        );
    };

    match work.available_condition() {
        None => {
            return available(
                ConditionStatus::Unknown,
                reasons::WORK_NOT_APPLIED,
                "Work is not applied yet",
            );
        }
        Some(c) if c.status == ConditionStatus::False => {
            return available(
                ConditionStatus::False,
                reasons::WORK_APPLY_FAILED,
                c.message.clone(),
            );
        }
        Some(_) => {}
    }

    let Some(prober) = work_prober else {
        return available(
            ConditionStatus::True,
            reasons::WORK_APPLIED,
            "Addon work is applied",
        );
    };

    for field in &prober.probe_fields {
        let Some(result) = work.feedback_for(&field.resource_identifier) else {
            return available(
                ConditionStatus::Unknown,
                reasons::NO_PROBE_RESULT,
                "Probe results are not returned",
            );
        };

        if let Err(e) = (prober.health_check)(&field.resource_identifier, result) {
            return available(
                ConditionStatus::False,
                reasons::PROBE_UNAVAILABLE,
                format!("Probe addon unavailable with err {}", e),
            );
        }
    }

    available(
        ConditionStatus::True,
        reasons::PROBE_AVAILABLE,
        "Addon is available",
    )
}

fn available(status: ConditionStatus, reason: &str, message: impl Into<String>) -> Condition {
    Condition::new(AVAILABLE, status, reason, message)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building and applying the ManifestWork that carries an addon's manifests

use crate::addon::{AgentAddonOptions, HealthProberType};
use crate::constants::{deploy_work_name, labels, OPERATOR_NAME};
use crate::error::Result;
use crate::types::work::{ManifestConfigOption, ManifestsTemplate};
use crate::types::{ManagedClusterAddOn, ManifestWork, ManifestWorkSpec};
use kube::{
    api::{DynamicObject, Patch, PatchParams},
    Api, Client, Resource, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Build the deploy work for `addon` from its rendered `manifests`.
///
/// The work lives in the cluster namespace, is labelled with the addon name
/// and is owned by the addon instance so it goes away with it.
pub fn build_deploy_work(
    addon: &ManagedClusterAddOn,
    options: &AgentAddonOptions,
    manifests: &[DynamicObject],
) -> Result<ManifestWork> {
    let manifests = manifests
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut work = ManifestWork::new(
        &deploy_work_name(&options.addon_name),
        ManifestWorkSpec {
            workload: ManifestsTemplate { manifests },
            manifest_configs: manifest_configs(options),
        },
    );
    work.metadata.namespace = Some(addon.cluster_name());
    work.metadata.labels = Some(BTreeMap::from([(
        labels::ADDON_NAME.to_string(),
        options.addon_name.clone(),
    )]));
    work.metadata.owner_references = addon.controller_owner_ref(&()).map(|owner| vec![owner]);

    Ok(work)
}

/// Feedback rules the work agent needs to report the probed fields
fn manifest_configs(options: &AgentAddonOptions) -> Vec<ManifestConfigOption> {
    let Some(prober) = options
        .health_prober
        .as_ref()
        .filter(|p| p.prober_type == HealthProberType::Work)
    else {
        return Vec::new();
    };

    prober
        .work_prober
        .iter()
        .flat_map(|w| w.probe_fields.iter())
        .map(|field| ManifestConfigOption {
            resource_identifier: field.resource_identifier.clone(),
            feedback_rules: field.probe_rules.clone(),
        })
        .collect()
}

/// Server-side apply `work`
#[instrument(
    skip(client, work),
    fields(work = %work.name_any(), namespace = %work.namespace().unwrap_or_default())
)]
pub async fn apply_work(client: &Client, work: &ManifestWork) -> Result<ManifestWork> {
    let namespace = work.namespace().unwrap_or_default();
    let api: Api<ManifestWork> = Api::namespaced(client.clone(), &namespace);

    let params = PatchParams::apply(OPERATOR_NAME).force();
    let applied = api.patch(&work.name_any(), &params, &Patch::Apply(work)).await?;

    info!("Applied deploy work");
    Ok(applied)
}

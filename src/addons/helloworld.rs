// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The helloworld example addon: a single agent deployment per managed cluster.

use crate::addon::{
    AgentAddonFactory, HealthProber, HealthProberType, InstallStrategy, ProbeField,
    RegistrationConfig, RegistrationOption, TemplateAgentAddon, Values, WorkHealthProber,
};
use crate::config::Config;
use crate::constants::DEFAULT_INSTALL_NAMESPACE;
use crate::error::Result;
use crate::types::work::{FeedbackRule, FeedbackRuleType};
use crate::types::{ResourceIdentifier, StatusFeedbackResult};
use anyhow::bail;
use serde::Serialize;
use std::sync::Arc;

pub const ADDON_NAME: &str = "helloworld";

const AGENT_DEPLOYMENT: &str = "helloworld-agent";
const KUBE_APISERVER_CLIENT_SIGNER: &str = "kubernetes.io/kube-apiserver-client";

const TEMPLATES: [(&str, &str); 3] = [
    (
        "service_account.yaml",
        include_str!("../../manifests/helloworld/service_account.yaml"),
    ),
    (
        "cluster_role_binding.yaml",
        include_str!("../../manifests/helloworld/cluster_role_binding.yaml"),
    ),
    (
        "deployment.yaml",
        include_str!("../../manifests/helloworld/deployment.yaml"),
    ),
];

/// Values the helloworld templates need on top of the reserved keys
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HelloworldValues<'a> {
    image: &'a str,
}

pub fn helloworld(config: &Config) -> Result<TemplateAgentAddon> {
    let install_namespace = config
        .helloworld_install_namespace
        .as_deref()
        .unwrap_or(DEFAULT_INSTALL_NAMESPACE);

    TEMPLATES
        .iter()
        .fold(AgentAddonFactory::new(ADDON_NAME), |factory, (name, body)| {
            factory.with_template(name, body)
        })
        .with_defaults(Values::from_serialize(&HelloworldValues {
            image: &config.helloworld_image,
        })?)
        .with_install_strategy(InstallStrategy::install_all(install_namespace))
        .with_registration_option(RegistrationOption {
            csr_configurations: vec![RegistrationConfig {
                signer_name: KUBE_APISERVER_CLIENT_SIGNER.to_string(),
                subject: format!("system:open-cluster-management:addon:{}", ADDON_NAME),
            }],
        })
        .with_health_prober(health_prober(config.helloworld_health_prober, install_namespace))
        .build()
}

fn health_prober(prober_type: HealthProberType, install_namespace: &str) -> HealthProber {
    if prober_type != HealthProberType::Work {
        return HealthProber::new(prober_type);
    }

    HealthProber::work(Some(WorkHealthProber {
        probe_fields: vec![ProbeField {
            resource_identifier: ResourceIdentifier::new(
                "apps",
                "deployments",
                install_namespace,
                AGENT_DEPLOYMENT,
            ),
            probe_rules: vec![FeedbackRule {
                rule_type: FeedbackRuleType::WellKnownStatus,
                json_paths: vec![],
            }],
        }],
        health_check: Arc::new(deployment_available),
    }))
}

/// The agent deployment is available once at least one replica is ready
fn deployment_available(
    identifier: &ResourceIdentifier,
    result: &StatusFeedbackResult,
) -> anyhow::Result<()> {
    let Some(value) = result.get("ReadyReplicas") else {
        bail!("readyReplicas is not probed");
    };

    match value.integer {
        Some(ready) if ready >= 1 => Ok(()),
        ready => bail!(
            "readyReplicas is {} for deployment {}/{}",
            ready.unwrap_or_default(),
            identifier.namespace,
            identifier.name
        ),
    }
}

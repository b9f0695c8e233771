// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template values and the layering that produces them for one addon instance.

use crate::addon::AgentAddonOptions;
use crate::constants::{values as reserved, DEFAULT_INSTALL_NAMESPACE};
use crate::error::{AddonError, Result};
use crate::types::{ManagedCluster, ManagedClusterAddOn};
use kube::ResourceExt;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Named values available to manifest templates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, Value>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Build values from the fields of a serializable struct or map
    pub fn from_serialize<T: Serialize>(config: &T) -> Result<Self> {
        match serde_json::to_value(config)? {
            Value::Object(fields) => Ok(Self(fields.into_iter().collect())),
            Value::Null => Ok(Self::new()),
            other => Err(AddonError::InvalidDefaults(format!(
                "expected a struct or map, got {}",
                other
            ))),
        }
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Overlay every entry of `other`, replacing existing keys
    pub fn merge(&mut self, other: Values) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse the template config annotation, which must be a JSON object
pub fn parse_template_config(raw: &str) -> Result<Values> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| AddonError::ConfigParseError(e.to_string()))?;

    match parsed {
        Value::Object(fields) => Ok(Values(fields.into_iter().collect())),
        other => Err(AddonError::ConfigParseError(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Resolve the namespace the addon agent is installed into
pub fn resolve_install_namespace(
    addon: &ManagedClusterAddOn,
    options: &AgentAddonOptions,
) -> String {
    addon
        .install_namespace()
        .or_else(|| {
            options
                .install_strategy
                .as_ref()
                .map(|s| s.install_namespace.as_str())
                .filter(|ns| !ns.is_empty())
        })
        .unwrap_or(DEFAULT_INSTALL_NAMESPACE)
        .to_string()
}

/// Build the values a template is rendered with for `addon` on `cluster`.
///
/// Layers, lowest precedence first: the addon defaults, the reserved keys
/// (`ClusterName`, `AddonInstallNamespace`, `KubeConfigSecret`) and the
/// `templateConfig` annotation. The annotation may override reserved keys.
/// A malformed annotation fails the whole merge.
pub fn build_context(
    cluster: &ManagedCluster,
    addon: &ManagedClusterAddOn,
    defaults: &Values,
    options: &AgentAddonOptions,
) -> Result<Values> {
    let mut values = defaults.clone();

    let addon_name = addon
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&options.addon_name);

    values.insert(reserved::CLUSTER_NAME, cluster.name_any());
    values.insert(
        reserved::ADDON_INSTALL_NAMESPACE,
        resolve_install_namespace(addon, options),
    );
    values.insert(
        reserved::KUBECONFIG_SECRET,
        format!("{}-hub-kubeconfig", addon_name),
    );

    if let Some(raw) = addon.template_config() {
        values.merge(parse_template_config(raw)?);
    }

    Ok(values)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds template based addons.

use crate::addon::template::render;
use crate::addon::values::build_context;
use crate::addon::{
    AgentAddon, AgentAddonOptions, HealthProber, InstallStrategy, RegistrationOption, Scheme,
    Values,
};
use crate::constants::DEFAULT_INSTALL_NAMESPACE;
use crate::error::{AddonError, Result};
use crate::types::{
    ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec,
};
use kube::api::DynamicObject;
use tracing::debug;

/// Builder for a [`TemplateAgentAddon`] from a set of named manifest templates.
///
/// ```ignore
/// let addon = AgentAddonFactory::new("helloworld")
///     .with_template("deployment.yaml", include_str!("deployment.yaml"))
///     .with_defaults(Values::new().with("Image", "quay.io/helloworld:latest"))
///     .build()?;
/// ```
pub struct AgentAddonFactory {
    scheme: Option<Scheme>,
    templates: Vec<(String, String)>,
    defaults: Values,
    options: AgentAddonOptions,
}

impl AgentAddonFactory {
    pub fn new(addon_name: &str) -> Self {
        Self {
            scheme: None,
            templates: Vec::new(),
            defaults: Values::new(),
            options: AgentAddonOptions {
                addon_name: addon_name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_template(mut self, name: &str, body: &str) -> Self {
        self.templates.push((name.to_string(), body.to_string()));
        self
    }

    /// Only needed when the manifests contain kinds outside the default scheme
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Values every template sees unless the addon instance overrides them.
    /// The reserved keys do not need to be part of the defaults.
    pub fn with_defaults(mut self, defaults: Values) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_install_strategy(mut self, mut strategy: InstallStrategy) -> Self {
        if strategy.install_namespace.is_empty() {
            strategy.install_namespace = DEFAULT_INSTALL_NAMESPACE.to_string();
        }
        self.options.install_strategy = Some(strategy);
        self
    }

    pub fn with_registration_option(mut self, option: RegistrationOption) -> Self {
        self.options.registration = Some(option);
        self
    }

    pub fn with_health_prober(mut self, prober: HealthProber) -> Self {
        self.options.health_prober = Some(prober);
        self
    }

    /// Build the addon. Every template is rendered and decoded once against an
    /// empty cluster and addon instance, so broken templates fail here.
    pub fn build(self) -> Result<TemplateAgentAddon> {
        if self.templates.is_empty() {
            return Err(AddonError::NoTemplates(self.options.addon_name));
        }

        let addon = TemplateAgentAddon {
            scheme: self.scheme.unwrap_or_default(),
            templates: self.templates,
            defaults: self.defaults,
            options: self.options,
        };
        addon.validate()?;

        Ok(addon)
    }
}

/// An addon whose manifests are rendered from templates
pub struct TemplateAgentAddon {
    scheme: Scheme,
    templates: Vec<(String, String)>,
    defaults: Values,
    options: AgentAddonOptions,
}

impl TemplateAgentAddon {
    fn validate(&self) -> Result<()> {
        let cluster = ManagedCluster::new("", ManagedClusterSpec::default());
        let addon = ManagedClusterAddOn::new("", ManagedClusterAddOnSpec::default());
        let values = build_context(&cluster, &addon, &self.defaults, &self.options)?;

        for (name, body) in &self.templates {
            let rendered = render(name, body, &values)?;
            self.scheme.decode(name, &rendered)?;
            debug!(addon = %self.options.addon_name, template = %name, "Template validated");
        }
        Ok(())
    }
}

impl AgentAddon for TemplateAgentAddon {
    fn manifests(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Vec<DynamicObject>> {
        let values = build_context(cluster, addon, &self.defaults, &self.options)?;

        self.templates
            .iter()
            .map(|(name, body)| {
                let rendered = render(name, body, &values)?;
                self.scheme.decode(name, &rendered)
            })
            .collect()
    }

    fn options(&self) -> &AgentAddonOptions {
        &self.options
    }
}

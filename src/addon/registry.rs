// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::addon::AgentAddon;
use crate::error::{AddonError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The addons this manager is responsible for, keyed by addon name
#[derive(Default, Clone)]
pub struct AddonRegistry {
    addons: HashMap<String, Arc<dyn AgentAddon>>,
}

impl AddonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, addon: Arc<dyn AgentAddon>) -> Result<()> {
        let name = addon.options().addon_name.clone();
        if self.addons.contains_key(&name) {
            return Err(AddonError::DuplicateAddon(name));
        }

        info!("Registered addon {}", name);
        self.addons.insert(name, addon);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AgentAddon>> {
        self.addons.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addons.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.addons.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AgentAddon>> {
        self.addons.values()
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }
}

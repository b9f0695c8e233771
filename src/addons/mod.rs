// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Addons bundled with the manager binary.

pub mod helloworld;

use crate::addon::AddonRegistry;
use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// A registry holding every bundled addon
pub fn registry(config: &Config) -> Result<AddonRegistry> {
    let mut registry = AddonRegistry::new();
    registry.register(Arc::new(helloworld::helloworld(config)?))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_helloworld() {
        let config = Config::from_lookup(|_| None).unwrap();
        let registry = registry(&config).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(helloworld::ADDON_NAME));
    }
}

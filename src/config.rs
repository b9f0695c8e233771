// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::addon::HealthProberType;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_WORKERS: u16 = 1;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 5;
const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 300;
const DEFAULT_HELLOWORLD_IMAGE: &str = "quay.io/open-cluster-management/helloworld-addon:latest";

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Reconciles each controller runs concurrently
    pub workers: u16,
    /// First delay used when requeueing a failed reconcile
    pub retry_base_delay: Duration,
    /// Upper bound for the per-object requeue delay
    pub retry_max_delay: Duration,
    /// Agent image used by the bundled helloworld addon
    pub helloworld_image: String,
    pub helloworld_install_namespace: Option<String>,
    /// How the helloworld addon's availability is determined
    pub helloworld_health_prober: HealthProberType,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let workers = match lookup("CONTROLLER_WORKERS") {
            Some(v) => v
                .parse::<u16>()
                .context("CONTROLLER_WORKERS must be an integer between 1 and 65535")?
                .max(1),
            None => DEFAULT_WORKERS,
        };

        let retry_base_delay_ms = match lookup("RETRY_BASE_DELAY_MS") {
            Some(v) => v
                .parse::<u64>()
                .context("RETRY_BASE_DELAY_MS must be an integer")?,
            None => DEFAULT_RETRY_BASE_DELAY_MS,
        };

        let retry_max_delay_secs = match lookup("RETRY_MAX_DELAY_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("RETRY_MAX_DELAY_SECS must be an integer")?,
            None => DEFAULT_RETRY_MAX_DELAY_SECS,
        };

        let helloworld_image =
            lookup("HELLOWORLD_IMAGE").unwrap_or_else(|| DEFAULT_HELLOWORLD_IMAGE.to_string());
        let helloworld_install_namespace =
            lookup("HELLOWORLD_INSTALL_NAMESPACE").filter(|ns| !ns.is_empty());

        let helloworld_health_prober = match lookup("HELLOWORLD_HEALTH_PROBER") {
            Some(v) => v
                .parse::<HealthProberType>()
                .context("HELLOWORLD_HEALTH_PROBER must be one of Lease, Work, None")?,
            None => HealthProberType::Work,
        };

        Ok(Config {
            workers,
            retry_base_delay: Duration::from_millis(retry_base_delay_ms),
            retry_max_delay: Duration::from_secs(retry_max_delay_secs),
            helloworld_image,
            helloworld_install_namespace,
            helloworld_health_prober,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.workers, 1);
        assert_eq!(config.retry_base_delay, Duration::from_millis(5));
        assert_eq!(config.retry_max_delay, Duration::from_secs(300));
        assert_eq!(config.helloworld_image, DEFAULT_HELLOWORLD_IMAGE);
        assert!(config.helloworld_install_namespace.is_none());
        assert_eq!(config.helloworld_health_prober, HealthProberType::Work);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CONTROLLER_WORKERS", "4"),
            ("RETRY_BASE_DELAY_MS", "100"),
            ("RETRY_MAX_DELAY_SECS", "30"),
            ("HELLOWORLD_IMAGE", "quay.io/helloworld:2.4"),
            ("HELLOWORLD_INSTALL_NAMESPACE", "hello"),
            ("HELLOWORLD_HEALTH_PROBER", "Lease"),
        ])
        .unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.retry_base_delay, Duration::from_millis(100));
        assert_eq!(config.retry_max_delay, Duration::from_secs(30));
        assert_eq!(config.helloworld_image, "quay.io/helloworld:2.4");
        assert_eq!(config.helloworld_install_namespace.as_deref(), Some("hello"));
        assert_eq!(config.helloworld_health_prober, HealthProberType::Lease);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let config = config_from(&[("CONTROLLER_WORKERS", "0")]).unwrap();
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_invalid_workers() {
        assert!(config_from(&[("CONTROLLER_WORKERS", "many")]).is_err());
    }

    #[test]
    fn test_unknown_prober_type() {
        assert!(config_from(&[("HELLOWORLD_HEALTH_PROBER", "Heartbeat")]).is_err());
    }

    #[test]
    fn test_empty_install_namespace_ignored() {
        let config = config_from(&[("HELLOWORLD_INSTALL_NAMESPACE", "")]).unwrap();
        assert!(config.helloworld_install_namespace.is_none());
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs the addon controllers side by side until shutdown.

use crate::addon::AddonRegistry;
use crate::config::Config;
use crate::controllers::deploy::AddonDeployController;
use crate::controllers::health_check::AddonHealthCheckController;
use crate::controllers::install::AddonInstallController;
use crate::controllers::retry::RetryBackoff;
use kube::runtime::controller;
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Runs every controller for the registered addons
pub struct AddonManager {
    client: Client,
    config: Config,
    registry: Arc<AddonRegistry>,
}

impl AddonManager {
    pub fn new(client: Client, config: Config, registry: AddonRegistry) -> Self {
        Self {
            client,
            config,
            registry: Arc::new(registry),
        }
    }

    /// Settings shared by every controller: at most `workers` reconciles run
    /// at once per controller
    pub fn controller_config(&self) -> controller::Config {
        controller::Config::default().concurrency(self.config.workers)
    }

    fn backoff(&self) -> RetryBackoff {
        RetryBackoff::new(self.config.retry_base_delay, self.config.retry_max_delay)
    }

    /// Run until `token` is cancelled. In-flight reconciles finish before the
    /// controllers stop.
    #[instrument(skip(self, token))]
    pub async fn run(self, token: CancellationToken) -> anyhow::Result<()> {
        info!(
            "Starting addon manager for {} addon(s): {}",
            self.registry.len(),
            self.registry.names().collect::<Vec<_>>().join(", ")
        );

        let health = AddonHealthCheckController::new(
            self.client.clone(),
            Arc::clone(&self.registry),
            self.backoff(),
        );
        let deploy = AddonDeployController::new(
            self.client.clone(),
            Arc::clone(&self.registry),
            self.backoff(),
        );
        let install = AddonInstallController::new(
            self.client.clone(),
            Arc::clone(&self.registry),
            self.backoff(),
        );

        tokio::join!(
            health.run(self.controller_config(), token.clone()),
            deploy.run(self.controller_config(), token.clone()),
            install.run(self.controller_config(), token.clone()),
        );

        info!("Addon manager stopped");
        Ok(())
    }
}

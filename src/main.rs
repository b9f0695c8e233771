// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ocm_addon_manager::addons;
use ocm_addon_manager::config::Config;
use ocm_addon_manager::controllers::AddonManager;
use ocm_addon_manager::kubernetes::wait_for_crds;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting addon manager");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: workers={}, helloworld_image={}",
        config.workers, config.helloworld_image
    );

    let registry = addons::registry(&config)?;

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the open-cluster-management CRDs before starting controllers
    info!("Waiting for ManagedCluster, ManagedClusterAddOn and ManifestWork CRDs...");
    wait_for_crds(&client).await?;

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    AddonManager::new(client, config, registry).run(token).await?;

    info!("Addon manager exited");
    Ok(())
}

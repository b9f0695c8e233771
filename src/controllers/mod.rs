// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Controllers for ManagedClusterAddOn and ManifestWork resources, built on
//! the kube-runtime controller.

pub mod deploy;
pub mod health_check;
pub mod install;
pub mod manager;
pub mod retry;
pub mod source;

pub use deploy::AddonDeployController;
pub use health_check::{
    evaluate_availability, expected_health_check_mode, AddonHealthCheckController,
};
pub use install::AddonInstallController;
pub use manager::AddonManager;
pub use retry::RetryBackoff;
pub use source::EventSource;

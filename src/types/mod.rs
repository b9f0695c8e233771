// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types watched and written by the addon manager.

pub mod addon;
pub mod cluster;
pub mod conditions;
pub mod work;

pub use addon::{
    HealthCheck, HealthCheckMode, ManagedClusterAddOn, ManagedClusterAddOnSpec,
    ManagedClusterAddOnStatus,
};
pub use cluster::{ManagedCluster, ManagedClusterSpec};
pub use conditions::{Condition, ConditionStatus};
pub use work::{ManifestWork, ManifestWorkSpec, ResourceIdentifier, StatusFeedbackResult};

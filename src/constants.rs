// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation keys read from ManagedClusterAddOn resources
pub mod annotations {
    /// JSON object whose keys override the addon's template values
    pub const TEMPLATE_CONFIG: &str = "templateConfig";
}

/// Label keys set on resources owned by an addon
pub mod labels {
    /// Name of the addon a ManifestWork was generated for
    pub const ADDON_NAME: &str = "open-cluster-management.io/addon-name";
}

/// Reserved template value keys, always computed by the manager
pub mod values {
    pub const CLUSTER_NAME: &str = "ClusterName";
    pub const ADDON_INSTALL_NAMESPACE: &str = "AddonInstallNamespace";
    pub const KUBECONFIG_SECRET: &str = "KubeConfigSecret";
}

/// Condition types and reasons written to addon status
pub mod conditions {
    pub const AVAILABLE: &str = "Available";

    pub mod reasons {
        pub const WORK_NOT_FOUND: &str = "WorkNotFound";
        pub const WORK_NOT_APPLIED: &str = "WorkNotApplied";
        pub const WORK_APPLY_FAILED: &str = "WorkApplyFailed";
        pub const WORK_APPLIED: &str = "WorkApplied";
        pub const NO_PROBE_RESULT: &str = "NoProbeResult";
        pub const PROBE_UNAVAILABLE: &str = "ProbeUnavailable";
        pub const PROBE_AVAILABLE: &str = "ProbeAvailable";
    }
}

/// Namespace addon agents are installed into when nothing else is configured
pub const DEFAULT_INSTALL_NAMESPACE: &str = "open-cluster-management-agent-addon";

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "ocm-addon-manager";

/// Name of the ManifestWork that carries an addon's manifests
pub fn deploy_work_name(addon_name: &str) -> String {
    format!("addon-{}-deploy", addon_name)
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRDs
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

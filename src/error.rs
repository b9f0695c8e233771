// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddonError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to render template {template}: {reason}")]
    RenderError { template: String, reason: String },

    #[error("Invalid template config annotation: {0}")]
    ConfigParseError(String),

    #[error("Failed to decode manifest {template}: {reason}")]
    DecodeError { template: String, reason: String },

    #[error("Addon {0} has no template files")]
    NoTemplates(String),

    #[error("Addon {0} is already registered")]
    DuplicateAddon(String),

    #[error("Invalid template defaults: {0}")]
    InvalidDefaults(String),

    #[error("Unknown health prober type: {0}")]
    InvalidProberType(String),

    #[error("Reconcile panicked: {0}")]
    ReconcilePanicked(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AddonError>;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoding rendered manifests into objects of known kinds.

use crate::error::{AddonError, Result};
use crate::kubernetes::crd::gvk;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::DynamicObject;
use kube::core::{GroupVersionKind, TypeMeta};
use kube::Resource;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

type Validator = fn(serde_json::Value) -> std::result::Result<(), serde_json::Error>;

fn validate_as<K: DeserializeOwned>(
    value: serde_json::Value,
) -> std::result::Result<(), serde_json::Error> {
    serde_json::from_value::<K>(value).map(|_| ())
}

/// The kinds a manifest may decode to
#[derive(Clone)]
pub struct Scheme {
    kinds: HashMap<GroupVersionKind, Validator>,
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new()
            .with::<Deployment>()
            .with::<DaemonSet>()
            .with::<ServiceAccount>()
            .with::<ConfigMap>()
            .with::<Secret>()
            .with::<Service>()
            .with::<Namespace>()
            .with::<Role>()
            .with::<RoleBinding>()
            .with::<ClusterRole>()
            .with::<ClusterRoleBinding>()
            .with::<CustomResourceDefinition>()
    }
}

impl Scheme {
    /// A scheme that knows no kinds
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register `K` so manifests of its kind decode
    pub fn register<K>(&mut self)
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        self.kinds.insert(gvk::<K>(), validate_as::<K>);
    }

    pub fn with<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        self.register::<K>();
        self
    }

    /// Decode one rendered manifest (YAML or JSON) named `name`
    pub fn decode(&self, name: &str, raw: &str) -> Result<DynamicObject> {
        let decode_error = |reason: String| AddonError::DecodeError {
            template: name.to_string(),
            reason,
        };

        let value: serde_json::Value =
            serde_yaml::from_str(raw).map_err(|e| decode_error(e.to_string()))?;
        if !value.is_object() {
            return Err(decode_error("manifest is not an object".to_string()));
        }

        let types: TypeMeta = serde_json::from_value(value.clone())
            .map_err(|e| decode_error(format!("missing apiVersion or kind: {}", e)))?;
        let gvk = GroupVersionKind::try_from(&types).map_err(|e| decode_error(e.to_string()))?;

        let validate = self.kinds.get(&gvk).ok_or_else(|| {
            decode_error(format!(
                "no kind {} is registered for version {}",
                types.kind, types.api_version
            ))
        })?;
        validate(value.clone()).map_err(|e| decode_error(e.to_string()))?;

        serde_json::from_value(value).map_err(|e| decode_error(e.to_string()))
    }
}

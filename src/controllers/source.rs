// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event sources: which changes to a watched collection concern a controller,
//! and which of its objects they map to.

use crate::addon::AddonRegistry;
use crate::constants::{deploy_work_name, labels};
use crate::types::{ManagedClusterAddOn, ManifestWork};
use kube::runtime::reflector::ObjectRef;
use kube::{Resource, ResourceExt};
use std::sync::Arc;

type Filter<K> = Box<dyn Fn(&K) -> bool + Send + Sync>;
type RefsFn<K, T> = Box<dyn Fn(&K) -> Vec<ObjectRef<T>> + Send + Sync>;

/// Maps changes of `K` objects onto the `T` objects a controller reconciles
pub struct EventSource<K, T: Resource> {
    name: &'static str,
    filter: Filter<K>,
    refs: RefsFn<K, T>,
}

impl<K, T> EventSource<K, T>
where
    K: Send + Sync + 'static,
    T: Resource + 'static,
    T::DynamicType: Send + Sync,
{
    pub fn new(
        name: &'static str,
        filter: impl Fn(&K) -> bool + Send + Sync + 'static,
        refs: impl Fn(&K) -> Vec<ObjectRef<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            filter: Box::new(filter),
            refs: Box::new(refs),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Objects to reconcile for a changed object; empty when the filter
    /// rejects it
    pub fn object_refs(&self, obj: &K) -> Vec<ObjectRef<T>> {
        if !(self.filter)(obj) {
            return Vec::new();
        }
        (self.refs)(obj)
    }

    /// The mapper handed to `Controller::watches`
    pub fn into_mapper(self) -> impl Fn(K) -> Vec<ObjectRef<T>> + Send + Sync + 'static {
        move |obj| self.object_refs(&obj)
    }
}

/// Deploy works of registered addons, mapped to the addon they belong to
pub fn deploy_work_source(
    registry: Arc<AddonRegistry>,
) -> EventSource<ManifestWork, ManagedClusterAddOn> {
    EventSource::new(
        "works",
        move |work: &ManifestWork| match work.labels().get(labels::ADDON_NAME) {
            Some(addon) => registry.contains(addon) && work.name_any() == deploy_work_name(addon),
            None => false,
        },
        |work: &ManifestWork| {
            let addon = work.labels().get(labels::ADDON_NAME).cloned().unwrap_or_default();
            vec![ObjectRef::new(&addon).within(&work.namespace().unwrap_or_default())]
        },
    )
}

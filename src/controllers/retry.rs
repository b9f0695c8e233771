// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Requeue policy shared by the controllers.

use crate::error::{AddonError, Result};
use futures::FutureExt;
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::Resource;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Capped exponential backoff, tracked per object
#[derive(Debug)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<String, u32>>,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Delay before the `failures`-th retry (0 based)
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// Record a failed reconcile of `obj` and return the requeue action for it
    pub fn requeue<K: Resource<DynamicType = ()>>(&self, obj: &K) -> Action {
        let key = object_key(obj);
        let failures = {
            let mut map = self.lock();
            let count = map.entry(key).or_insert(0);
            *count += 1;
            *count - 1
        };
        Action::requeue(self.delay(failures))
    }

    /// Reset the backoff of `obj` after a successful reconcile
    pub fn forget<K: Resource<DynamicType = ()>>(&self, obj: &K) {
        if self.lock().remove(&object_key(obj)).is_some() {
            debug!(key = %object_key(obj), "Reset retry backoff");
        }
    }

    pub fn failures<K: Resource<DynamicType = ()>>(&self, obj: &K) -> u32 {
        self.lock().get(&object_key(obj)).copied().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn object_key<K: Resource<DynamicType = ()>>(obj: &K) -> String {
    ObjectRef::from_obj(obj).to_string()
}

/// Turn a panic inside a reconcile into an error so the controller keeps
/// running and the object gets requeued.
pub async fn catch_panic<F>(reconcile: F) -> Result<Action>
where
    F: Future<Output = Result<Action>>,
{
    AssertUnwindSafe(reconcile)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AddonError::ReconcilePanicked(message))
        })
}

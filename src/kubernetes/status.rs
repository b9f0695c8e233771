// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status writes for ManagedClusterAddOn resources

use crate::error::Result;
use crate::types::{Condition, HealthCheck, HealthCheckMode, ManagedClusterAddOn};
use kube::{
    api::{Patch, PatchParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

/// Write `conditions` to the addon's status with a merge patch.
///
/// Nothing is sent when `conditions` equal what `addon` already carries, and
/// an addon deleted in the meantime is not an error. The patch carries the
/// addon's uid and resourceVersion, so a write computed from a stale copy is
/// rejected with a conflict instead of overwriting newer conditions. Returns
/// whether a patch was sent and accepted.
#[instrument(
    skip(client, addon, conditions),
    fields(cluster = %addon.cluster_name(), addon = %addon.name_any())
)]
pub async fn patch_addon_conditions(
    client: &Client,
    addon: &ManagedClusterAddOn,
    conditions: &[Condition],
) -> Result<bool> {
    if addon.conditions() == conditions {
        debug!("Conditions unchanged, skipping status patch");
        return Ok(false);
    }

    let api: Api<ManagedClusterAddOn> = Api::namespaced(client.clone(), &addon.cluster_name());
    let patch = conditions_patch(addon, conditions);

    match api
        .patch_status(&addon.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        Ok(_) => {
            info!("Updated addon conditions");
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Addon no longer exists, dropping status patch");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn conditions_patch(addon: &ManagedClusterAddOn, conditions: &[Condition]) -> serde_json::Value {
    let mut metadata = serde_json::Map::new();
    if let Some(uid) = &addon.metadata.uid {
        metadata.insert("uid".to_string(), uid.clone().into());
    }
    if let Some(version) = &addon.metadata.resource_version {
        metadata.insert("resourceVersion".to_string(), version.clone().into());
    }

    serde_json::json!({
        "metadata": metadata,
        "status": {
            "conditions": conditions
        }
    })
}

/// Replace the addon's status with one carrying `mode` as health check mode.
///
/// Returns the addon as stored by the API server, or `None` when it no longer
/// exists.
#[instrument(
    skip(client, addon),
    fields(cluster = %addon.cluster_name(), addon = %addon.name_any())
)]
pub async fn update_health_check_mode(
    client: &Client,
    addon: &ManagedClusterAddOn,
    mode: HealthCheckMode,
) -> Result<Option<ManagedClusterAddOn>> {
    let mut updated = addon.clone();
    updated.status.get_or_insert_with(Default::default).health_check =
        Some(HealthCheck { mode: Some(mode) });

    let api: Api<ManagedClusterAddOn> = Api::namespaced(client.clone(), &addon.cluster_name());
    let data = serde_json::to_vec(&updated)?;

    match api
        .replace_status(&addon.name_any(), &PostParams::default(), data)
        .await
    {
        Ok(stored) => {
            info!("Set health check mode to {:?}", mode);
            Ok(Some(stored))
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Addon no longer exists, dropping health check mode update");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AddonError;
    use crate::test_utils::{conflict_json, server_error_json, MockService};
    use crate::types::{ConditionStatus, ManagedClusterAddOnSpec, ManagedClusterAddOnStatus};

    const ADDON_STATUS_PATH: &str = "/apis/addon.open-cluster-management.io/v1alpha1/namespaces/\
         cluster1/managedclusteraddons/helloworld/status";

    fn make_addon(conditions: Vec<Condition>) -> ManagedClusterAddOn {
        let mut addon = ManagedClusterAddOn::new("helloworld", ManagedClusterAddOnSpec::default());
        addon.metadata.namespace = Some("cluster1".to_string());
        addon.status = Some(ManagedClusterAddOnStatus {
            conditions,
            health_check: None,
        });
        addon
    }

    fn available() -> Condition {
        let mut condition = Condition::new(
            "Available",
            ConditionStatus::True,
            "ProbeAvailable",
            "Addon is available",
        );
        condition.last_transition_time = Some("2026-01-01T00:00:00Z".to_string());
        condition
    }

    fn json<T: serde::Serialize>(obj: &T) -> String {
        serde_json::to_string(obj).unwrap()
    }

    #[tokio::test]
    async fn test_patch_skipped_when_unchanged() {
        let mock = MockService::new();
        let client = mock.clone().into_client();
        let addon = make_addon(vec![available()]);

        let patched = patch_addon_conditions(&client, &addon, &[available()]).await.unwrap();

        assert!(!patched);
        assert_eq!(mock.request_count("PATCH"), 0);
    }

    #[tokio::test]
    async fn test_patch_sends_conditions() {
        let addon = make_addon(vec![]);
        let mock = MockService::new().on_patch(ADDON_STATUS_PATH, 200, &json(&addon));
        let client = mock.clone().into_client();

        let patched = patch_addon_conditions(&client, &addon, &[available()]).await.unwrap();

        assert!(patched);
        let requests = mock.requests("PATCH");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, ADDON_STATUS_PATH);
        let body = requests[0].json();
        assert_eq!(body["status"]["conditions"][0]["reason"], "ProbeAvailable");
        assert_eq!(body["status"]["conditions"][0]["status"], "True");
    }

    #[tokio::test]
    async fn test_patch_carries_resource_version() {
        let mut addon = make_addon(vec![]);
        addon.metadata.uid = Some("addon-uid".to_string());
        addon.metadata.resource_version = Some("41".to_string());
        let mock = MockService::new().on_patch(ADDON_STATUS_PATH, 200, &json(&addon));
        let client = mock.clone().into_client();

        patch_addon_conditions(&client, &addon, &[available()]).await.unwrap();

        let body = mock.requests("PATCH")[0].json();
        assert_eq!(body["metadata"]["uid"], "addon-uid");
        assert_eq!(body["metadata"]["resourceVersion"], "41");
    }

    #[tokio::test]
    async fn test_patch_conflict_is_an_error() {
        let mut addon = make_addon(vec![]);
        addon.metadata.resource_version = Some("41".to_string());
        let mock = MockService::new().on_patch(
            ADDON_STATUS_PATH,
            409,
            &conflict_json("managedclusteraddons", "helloworld"),
        );
        let client = mock.into_client();

        let result = patch_addon_conditions(&client, &addon, &[available()]).await;
        assert!(matches!(result, Err(AddonError::KubeError(kube::Error::Api(e))) if e.code == 409));
    }

    #[tokio::test]
    async fn test_patch_on_deleted_addon_is_noop() {
        let mock = MockService::new();
        let client = mock.clone().into_client();
        let addon = make_addon(vec![]);

        let patched = patch_addon_conditions(&client, &addon, &[available()]).await.unwrap();

        assert!(!patched);
        assert_eq!(mock.request_count("PATCH"), 1);
    }

    #[tokio::test]
    async fn test_patch_propagates_server_errors() {
        let mock = MockService::new().on_patch(
            ADDON_STATUS_PATH,
            500,
            &server_error_json(),
        );
        let client = mock.into_client();

        let result = patch_addon_conditions(&client, &make_addon(vec![]), &[available()]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_health_check_mode() {
        let mut stored = make_addon(vec![]);
        stored.status.as_mut().unwrap().health_check = Some(HealthCheck {
            mode: Some(HealthCheckMode::Customized),
        });
        let mock = MockService::new().on_put(ADDON_STATUS_PATH, 200, &json(&stored));
        let client = mock.clone().into_client();

        let updated =
            update_health_check_mode(&client, &make_addon(vec![]), HealthCheckMode::Customized)
                .await
                .unwrap()
                .unwrap();

        assert_eq!(updated.health_check_mode(), Some(HealthCheckMode::Customized));
        let requests = mock.requests("PUT");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].json()["status"]["healthCheck"]["mode"], "Customized");
    }

    #[tokio::test]
    async fn test_update_health_check_mode_on_deleted_addon() {
        let client = MockService::new().into_client();

        let updated = update_health_check_mode(&client, &make_addon(vec![]), HealthCheckMode::Lease)
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}

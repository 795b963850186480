//! Kubernetes-backed store implementation using server-side apply.

use crate::constants::FIELD_MANAGER;
use crate::crd::{ManagedResource, ManagedResourceSpec, SecretRef};
use crate::observability::metrics;
use crate::store::{ManagedResourceStore, SecretStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{Patch, PatchParams};
use kube::core::ObjectMeta;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Production store writing through the cluster API client. The client is
/// safe for concurrent use, so one store can serve passes for different
/// network resources at the same time.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Build the secret object applied for one package
fn build_secret(namespace: &str, name: &str, key: &str, data: &[u8]) -> serde_json::Value {
    let mut payload = BTreeMap::new();
    payload.insert(key.to_string(), ByteString(data.to_vec()));

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
        },
        "type": "Opaque",
        "data": payload,
    })
}

/// Build the managed resource applied at the end of a pass
fn build_managed_resource(
    namespace: &str,
    name: &str,
    secret_refs: Vec<SecretRef>,
    inject_labels: BTreeMap<String, String>,
) -> ManagedResource {
    ManagedResource {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        spec: ManagedResourceSpec {
            secret_refs,
            inject_labels,
        },
    }
}

#[async_trait]
impl SecretStore for KubeStore {
    async fn upsert_secret(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        data: &[u8],
    ) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = build_secret(namespace, name, key, data);

        api.patch(
            name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&secret),
        )
        .await
        .with_context(|| format!("failed to apply secret {namespace}/{name}"))?;

        debug!("Applied secret {}/{} ({} bytes)", namespace, name, data.len());
        metrics::increment_secrets_published();
        Ok(())
    }
}

#[async_trait]
impl ManagedResourceStore for KubeStore {
    async fn upsert_managed_resource(
        &self,
        namespace: &str,
        name: &str,
        secret_refs: Vec<SecretRef>,
        inject_labels: BTreeMap<String, String>,
    ) -> Result<()> {
        let api: Api<ManagedResource> = Api::namespaced(self.client.clone(), namespace);
        let resource = build_managed_resource(namespace, name, secret_refs, inject_labels);

        api.patch(
            name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&resource),
        )
        .await
        .with_context(|| format!("failed to apply managed resource {namespace}/{name}"))?;

        debug!("Applied managed resource {}/{}", namespace, name);
        metrics::increment_managed_resources_published();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NO_CLEANUP_LABEL;

    #[test]
    fn test_build_secret_carries_single_base64_key() {
        let secret = build_secret("shoot--foo--bar", "network-addon", "network-addon.yaml", b"x");

        assert_eq!(secret["kind"], "Secret");
        assert_eq!(secret["metadata"]["name"], "network-addon");
        assert_eq!(secret["metadata"]["namespace"], "shoot--foo--bar");
        // ByteString serializes as base64; "x" is "eA=="
        assert_eq!(secret["data"]["network-addon.yaml"], "eA==");
        assert_eq!(secret["data"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_build_managed_resource_keeps_refs_and_labels() {
        let refs = vec![SecretRef::new("network-addon"), SecretRef::new("network-addon-rbac")];
        let labels =
            BTreeMap::from([(NO_CLEANUP_LABEL.to_string(), "true".to_string())]);

        let resource = build_managed_resource("ns", "shoot-network", refs.clone(), labels);

        assert_eq!(resource.metadata.name.as_deref(), Some("shoot-network"));
        assert_eq!(resource.spec.secret_refs, refs);
        assert_eq!(
            resource.spec.inject_labels.get(NO_CLEANUP_LABEL).map(String::as_str),
            Some("true")
        );
    }
}

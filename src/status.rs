//! # Status Updates
//!
//! Capability for the final step of a pass: recording the reconciled state
//! on the network resource's status subresource.

use crate::config::NetworkConfig;
use crate::constants::FIELD_MANAGER;
use crate::crd::{Condition, Network, NetworkStatus};
use anyhow::Result;
use async_trait::async_trait;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use tracing::debug;

/// Provider-specific status update, invoked once per successful pass
#[async_trait]
pub trait StatusUpdater: Send + Sync {
    async fn update_status(&self, network: &Network, config: &NetworkConfig) -> Result<()>;
}

/// Production updater patching the Network status subresource
#[derive(Clone)]
pub struct KubeStatusUpdater {
    client: Client,
}

impl std::fmt::Debug for KubeStatusUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStatusUpdater").finish_non_exhaustive()
    }
}

impl KubeStatusUpdater {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusUpdater for KubeStatusUpdater {
    async fn update_status(&self, network: &Network, config: &NetworkConfig) -> Result<()> {
        let status = NetworkStatus {
            phase: Some("Ready".to_string()),
            description: Some("Network add-on manifests published".to_string()),
            conditions: vec![Condition {
                r#type: "Ready".to_string(),
                status: "True".to_string(),
                last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
                reason: Some("ReconciliationSucceeded".to_string()),
                message: None,
            }],
            observed_generation: network.metadata.generation,
            last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
            backend: config.backend.map(|b| b.as_str().to_string()),
        };

        patch_status(&self.client, network, status).await
    }
}

/// Record a failed pass on the status subresource. Best-effort from the
/// reconcile loop; failures here are logged, never propagated.
pub async fn update_status_failure(client: &Client, network: &Network, message: &str) -> Result<()> {
    let status = NetworkStatus {
        phase: Some("Failed".to_string()),
        description: Some(message.to_string()),
        conditions: vec![Condition {
            r#type: "Ready".to_string(),
            status: "False".to_string(),
            last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
            reason: Some("ReconciliationFailed".to_string()),
            message: Some(message.to_string()),
        }],
        observed_generation: network.metadata.generation,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
        backend: None,
    };

    patch_status(client, network, status).await
}

async fn patch_status(client: &Client, network: &Network, status: NetworkStatus) -> Result<()> {
    let api: Api<Network> = Api::namespaced(
        client.clone(),
        network.metadata.namespace.as_deref().unwrap_or("default"),
    );

    let patch = serde_json::json!({ "status": status });
    api.patch_status(
        network.metadata.name.as_deref().unwrap_or("unknown"),
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(patch),
    )
    .await?;

    debug!(
        "Patched status of network {}",
        network.metadata.name.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

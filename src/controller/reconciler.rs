//! # Reconciler
//!
//! Entry point invoked by the watch layer for every `Network` event. Each
//! invocation runs exactly one pipeline pass; all resilience is
//! re-invocation with the backoff the watch layer applies.

use crate::charts::ChartRenderer;
use crate::constants::{DEFAULT_ERROR_REQUEUE_SECS, DEFAULT_RESYNC_SECS};
use crate::crd::Network;
use crate::observability::metrics;
use crate::pipeline::{run_pass, Capabilities, Pass, PassError};
use crate::status::{update_status_failure, KubeStatusUpdater, StatusUpdater};
use crate::store::{KubeStore, ManagedResourceStore, SecretStore};
use kube::Client;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(#[from] PassError),
}

/// Shared context handed to every reconciliation. The cluster client is
/// safe for concurrent use; everything else a pass touches is pass-local.
#[derive(Clone)]
pub struct Reconciler {
    client: Client,
    renderer: Arc<dyn ChartRenderer>,
    secrets: Arc<dyn SecretStore>,
    managed_resources: Arc<dyn ManagedResourceStore>,
    status: Arc<dyn StatusUpdater>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(client: Client, renderer: Arc<dyn ChartRenderer>) -> Self {
        let store = Arc::new(KubeStore::new(client.clone()));
        Self {
            status: Arc::new(KubeStatusUpdater::new(client.clone())),
            secrets: store.clone(),
            managed_resources: store,
            renderer,
            client,
        }
    }

    fn capabilities(&self) -> Capabilities<'_> {
        Capabilities {
            renderer: self.renderer.as_ref(),
            secrets: self.secrets.as_ref(),
            managed_resources: self.managed_resources.as_ref(),
            status: self.status.as_ref(),
        }
    }
}

/// Reconcile one network resource. Errors are handled by `error_policy`,
/// which requeues the whole pass.
pub async fn reconcile(
    network: Arc<Network>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let start = Instant::now();
    let name = network.metadata.name.as_deref().unwrap_or("unknown");
    let namespace = network.metadata.namespace.as_deref().unwrap_or("default");

    let span = tracing::span!(
        tracing::Level::INFO,
        "reconcile",
        resource.name = name,
        resource.namespace = namespace,
        resource.kind = "Network"
    );
    let _guard = span.enter();

    info!("Reconciling network {}/{}", namespace, name);
    metrics::increment_reconciliations();

    let mut pass = Pass::new();
    match run_pass(&mut pass, &ctx.capabilities(), &network).await {
        Ok(()) => {
            metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
            info!(
                "Reconciliation complete for {}/{} ({:.2}s)",
                namespace,
                name,
                start.elapsed().as_secs_f64()
            );
            Ok(Action::requeue(Duration::from_secs(DEFAULT_RESYNC_SECS)))
        }
        Err(err) => {
            metrics::increment_reconciliation_errors();

            if err.resources_applied() {
                // All objects were applied; only the status write is stale.
                // The next pass is a no-op apart from correcting the status.
                warn!(
                    "Network {}/{} applied but status is stale (failed at {}): {}",
                    namespace,
                    name,
                    pass.state().as_str(),
                    err
                );
            } else {
                error!(
                    "Reconciliation failed for {}/{} at state {}: {}",
                    namespace,
                    name,
                    pass.state().as_str(),
                    err
                );
                if let Err(status_err) =
                    update_status_failure(&ctx.client, &network, &err.to_string()).await
                {
                    warn!("Failed to record failure status: {}", status_err);
                }
            }

            Err(ReconcilerError::ReconciliationFailed(err))
        }
    }
}

/// Requeue policy for failed passes; all writes are idempotent upserts, so
/// re-running the whole pass is always safe
pub fn error_policy(network: Arc<Network>, error: &ReconcilerError, _ctx: Arc<Reconciler>) -> Action {
    error!(
        "Requeueing network {} after error: {}",
        network.metadata.name.as_deref().unwrap_or("unknown"),
        error
    );
    Action::requeue(Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS))
}

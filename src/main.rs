//! # Network Add-on Controller
//!
//! A Kubernetes controller that reconciles cluster network add-ons.
//!
//! ## Overview
//!
//! For every `Network` resource the controller:
//!
//! 1. **Decodes the provider configuration** carried by the resource
//! 2. **Computes chart values** - images plus cluster-specific globals
//! 3. **Renders the add-on chart** into a fixed set of named manifests
//! 4. **Packages the manifests** into four secrets, including the
//!    concatenated pod-security-policy bundle
//! 5. **Publishes a ManagedResource** referencing the secrets, which an
//!    external applier reconciles against the live cluster
//! 6. **Updates the Network status** once everything is published
//!
//! All writes are idempotent upserts; failed passes are requeued whole.

use anyhow::{Context, Result};
use futures::StreamExt;
use kube::{Api, Client};
use kube_runtime::{watcher, Controller};
use network_addon_controller::charts::HelmChartRenderer;
use network_addon_controller::constants::DEFAULT_METRICS_PORT;
use network_addon_controller::controller::{error_policy, reconcile, Reconciler};
use network_addon_controller::crd::Network;
use network_addon_controller::observability::metrics;
use network_addon_controller::server::{start_server, ServerState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "network_addon_controller=info".into()),
        )
        .init();

    info!("Starting network add-on controller");

    metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState {
        is_ready: Arc::new(AtomicBool::new(false)),
    });

    let server_port = std::env::var("METRICS_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_METRICS_PORT);

    let server_state_clone = server_state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    // Watch Network resources across all namespaces; one reconciliation
    // pass per event, at most one concurrent pass per object
    let networks: Api<Network> = Api::all(client.clone());

    let renderer = Arc::new(HelmChartRenderer::new());
    let reconciler = Arc::new(Reconciler::new(client, renderer));

    server_state.is_ready.store(true, Ordering::Relaxed);

    Controller::new(networks, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, reconciler)
        .for_each(|_| std::future::ready(()))
        .await;

    info!("Controller stopped");
    Ok(())
}

//! # Reconciliation Pipeline
//!
//! One pass turns a `Network` resource into published cluster objects:
//! decode the provider configuration, compute chart values, render the
//! chart, package the manifests into secrets and publish the aggregate
//! managed resource, then record status. Strictly sequential; any failure
//! aborts the pass and leaves retry to the watch layer.

pub mod error;
pub mod state;

pub use error::PassError;
pub use state::{Pass, PassState};

use crate::charts::{self, AddonManifests, ChartRenderer};
use crate::config::network_config_from_resource;
use crate::constants::{CHART_PATH, NO_CLEANUP_LABEL, RELEASE_NAME, RENDER_NAMESPACE};
use crate::crd::{Network, SecretRef};
use crate::packaging::{package_manifests, SecretPackage};
use crate::status::StatusUpdater;
use crate::store::{ManagedResourceStore, SecretStore};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// External capabilities one pass suspends on. All intermediate data is
/// pass-local; the capabilities are the only shared resources.
pub struct Capabilities<'a> {
    pub renderer: &'a dyn ChartRenderer,
    pub secrets: &'a dyn SecretStore,
    pub managed_resources: &'a dyn ManagedResourceStore,
    pub status: &'a dyn StatusUpdater,
}

impl std::fmt::Debug for Capabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// Run one full reconciliation pass for a single network resource.
///
/// The pass state is advanced after each completed step; on error the pass
/// stays at the last completed state. A descriptor is never published
/// before every referenced secret has been upserted.
pub async fn run_pass(
    pass: &mut Pass,
    caps: &Capabilities<'_>,
    network: &Network,
) -> Result<(), PassError> {
    let (name, namespace) = identity(network)?;

    let config = network_config_from_resource(network).map_err(PassError::Validation)?;
    pass.advance();

    let values = charts::compute_chart_values(network, &config);
    let chart = caps
        .renderer
        .render(CHART_PATH, RELEASE_NAME, RENDER_NAMESPACE, &values)
        .map_err(PassError::Render)?;
    pass.advance();

    let manifests = AddonManifests::try_from_rendered(&chart)?;
    let packages = package_manifests(&manifests);
    pass.advance();
    debug!(
        "Packaged {} secrets for network {}/{}",
        packages.len(),
        namespace,
        name
    );

    let secret_refs = publish_secrets(caps.secrets, &packages, &namespace).await?;
    pass.advance();

    publish_descriptor(caps.managed_resources, &namespace, &name, secret_refs).await?;
    pass.advance();

    caps.status
        .update_status(network, &config)
        .await
        .map_err(PassError::StatusUpdate)?;
    pass.advance();

    info!(
        "Published network add-on for {}/{} (state: {})",
        namespace,
        name,
        pass.state().as_str()
    );
    Ok(())
}

fn identity(network: &Network) -> Result<(String, String), PassError> {
    let name = network
        .metadata
        .name
        .clone()
        .ok_or_else(|| PassError::Validation(anyhow::anyhow!("network resource has no name")))?;
    let namespace = network.metadata.namespace.clone().ok_or_else(|| {
        PassError::Validation(anyhow::anyhow!("network resource has no namespace"))
    })?;
    Ok((name, namespace))
}

/// Upsert every package in order; the first failure aborts the remaining
/// writes and surfaces to the caller
async fn publish_secrets(
    store: &dyn SecretStore,
    packages: &[SecretPackage],
    namespace: &str,
) -> Result<Vec<SecretRef>, PassError> {
    let mut refs = Vec::with_capacity(packages.len());
    for package in packages {
        store
            .upsert_secret(namespace, package.secret_name, package.key, &package.data)
            .await
            .map_err(|source| PassError::SecretPublication {
                name: package.secret_name.to_string(),
                source,
            })?;
        refs.push(SecretRef::new(package.secret_name));
    }
    Ok(refs)
}

/// Publish the aggregate descriptor referencing the published secrets
async fn publish_descriptor(
    store: &dyn ManagedResourceStore,
    namespace: &str,
    name: &str,
    secret_refs: Vec<SecretRef>,
) -> Result<(), PassError> {
    let labels = BTreeMap::from([(NO_CLEANUP_LABEL.to_string(), "true".to_string())]);
    store
        .upsert_managed_resource(namespace, name, secret_refs, labels)
        .await
        .map_err(|source| PassError::DescriptorPublication {
            name: name.to_string(),
            source,
        })
}

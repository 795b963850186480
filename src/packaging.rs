//! # Secret Packaging
//!
//! Partitions an extracted manifest set into the four secret payloads the
//! publication step writes to the cluster: three singleton manifests plus
//! one concatenated pod-security-policy bundle.

use crate::charts::{
    AddonManifests, MissingManifestError, RenderedChart, AGENT_CLUSTER_ROLE_BINDING_KEY,
    AGENT_CLUSTER_ROLE_KEY, AGENT_POD_SECURITY_POLICY_KEY, CONFIG_KEY,
    CONTROLLERS_CLUSTER_ROLE_BINDING_KEY, CONTROLLERS_CLUSTER_ROLE_KEY,
    CONTROLLERS_POD_SECURITY_POLICY_KEY, MAIN_KEY, NODE_CLUSTER_ROLE_BINDING_KEY,
    NODE_CLUSTER_ROLE_KEY, NODE_POD_SECURITY_POLICY_KEY, RBAC_KEY,
};
use crate::constants::{
    CONFIG_SECRET_NAME, MAIN_SECRET_NAME, POLICY_SECRET_NAME, RBAC_SECRET_NAME,
};

/// Separator inserted between bundled manifests
pub const YAML_DOCUMENT_SEPARATOR: &str = "\n---\n";

/// Single key of the policy bundle secret. Unlike the singleton packages,
/// which reuse their manifest's own key, the bundle gets a fixed file name.
pub const POLICY_BUNDLE_KEY: &str = "psps.yaml";

/// Concatenation order of the policy bundle.
///
/// This order is a committed contract: downstream appliers may depend on
/// document order, so it is preserved exactly rather than re-derived.
pub const POLICY_BUNDLE_ORDER: [&str; 9] = [
    AGENT_CLUSTER_ROLE_BINDING_KEY,
    AGENT_CLUSTER_ROLE_KEY,
    NODE_CLUSTER_ROLE_KEY,
    AGENT_POD_SECURITY_POLICY_KEY,
    NODE_CLUSTER_ROLE_BINDING_KEY,
    NODE_POD_SECURITY_POLICY_KEY,
    CONTROLLERS_CLUSTER_ROLE_KEY,
    CONTROLLERS_CLUSTER_ROLE_BINDING_KEY,
    CONTROLLERS_POD_SECURITY_POLICY_KEY,
];

/// One named byte payload destined for a secret at a fixed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPackage {
    pub secret_name: &'static str,
    pub key: &'static str,
    pub data: Vec<u8>,
}

/// Extract the expected manifests from a rendered chart and package them.
///
/// Fails without producing any package when an expected manifest is absent.
pub fn extract_packages(chart: &RenderedChart) -> Result<Vec<SecretPackage>, MissingManifestError> {
    let manifests = AddonManifests::try_from_rendered(chart)?;
    Ok(package_manifests(&manifests))
}

/// Partition a complete manifest set into exactly four packages
pub fn package_manifests(manifests: &AddonManifests) -> Vec<SecretPackage> {
    vec![
        SecretPackage {
            secret_name: MAIN_SECRET_NAME,
            key: MAIN_KEY,
            data: manifests.main.clone().into_bytes(),
        },
        SecretPackage {
            secret_name: CONFIG_SECRET_NAME,
            key: CONFIG_KEY,
            data: manifests.config.clone().into_bytes(),
        },
        SecretPackage {
            secret_name: RBAC_SECRET_NAME,
            key: RBAC_KEY,
            data: manifests.rbac.clone().into_bytes(),
        },
        SecretPackage {
            secret_name: POLICY_SECRET_NAME,
            key: POLICY_BUNDLE_KEY,
            data: policy_bundle(manifests).into_bytes(),
        },
    ]
}

/// Join the nine policy manifests in bundle order, no trailing separator
fn policy_bundle(manifests: &AddonManifests) -> String {
    POLICY_BUNDLE_ORDER
        .iter()
        .filter_map(|key| manifests.manifest(key))
        .collect::<Vec<_>>()
        .join(YAML_DOCUMENT_SEPARATOR)
}

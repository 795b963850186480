//! # Chart Values and Manifest Extraction
//!
//! Computes the value document consumed by templating and extracts the
//! fixed set of expected manifests from a rendered chart. The expected keys
//! are declared as data so the contract with the chart stays auditable.

pub mod helm;
pub mod renderer;

pub use helm::HelmChartRenderer;
pub use renderer::{ChartRenderer, Manifest, RenderedChart};

use crate::config::NetworkConfig;
use crate::crd::Network;
use crate::images;
use serde_json::json;
use thiserror::Error;

/// Main add-on manifest (daemon sets, deployments, services)
pub const MAIN_KEY: &str = "network-addon.yaml";
/// Add-on config map manifest
pub const CONFIG_KEY: &str = "config.yaml";
/// RBAC manifest
pub const RBAC_KEY: &str = "rbac.yaml";

pub const NODE_CLUSTER_ROLE_KEY: &str = "psp/node-clusterrole.yaml";
pub const NODE_CLUSTER_ROLE_BINDING_KEY: &str = "psp/node-clusterrolebinding.yaml";
pub const NODE_POD_SECURITY_POLICY_KEY: &str = "psp/node-psp.yaml";

pub const AGENT_CLUSTER_ROLE_KEY: &str = "psp/agent-clusterrole.yaml";
pub const AGENT_CLUSTER_ROLE_BINDING_KEY: &str = "psp/agent-clusterrolebinding.yaml";
pub const AGENT_POD_SECURITY_POLICY_KEY: &str = "psp/agent-psp.yaml";

pub const CONTROLLERS_CLUSTER_ROLE_KEY: &str = "psp/controllers-clusterrole.yaml";
pub const CONTROLLERS_CLUSTER_ROLE_BINDING_KEY: &str = "psp/controllers-clusterrolebinding.yaml";
pub const CONTROLLERS_POD_SECURITY_POLICY_KEY: &str = "psp/controllers-psp.yaml";

/// Every manifest the chart must render; a partial set is never packaged
pub const EXPECTED_MANIFEST_KEYS: [&str; 12] = [
    MAIN_KEY,
    CONFIG_KEY,
    RBAC_KEY,
    NODE_CLUSTER_ROLE_KEY,
    NODE_CLUSTER_ROLE_BINDING_KEY,
    NODE_POD_SECURITY_POLICY_KEY,
    AGENT_CLUSTER_ROLE_KEY,
    AGENT_CLUSTER_ROLE_BINDING_KEY,
    AGENT_POD_SECURITY_POLICY_KEY,
    CONTROLLERS_CLUSTER_ROLE_KEY,
    CONTROLLERS_CLUSTER_ROLE_BINDING_KEY,
    CONTROLLERS_POD_SECURITY_POLICY_KEY,
];

/// The rendered chart omitted an expected manifest. Indicates a chart or
/// version mismatch and is not retryable without operator intervention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rendered chart is missing manifest {key:?}")]
pub struct MissingManifestError {
    pub key: &'static str,
}

/// The full set of manifests rendered for one pass, keyed by template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonManifests {
    pub main: String,
    pub config: String,
    pub rbac: String,

    pub node_cluster_role: String,
    pub node_cluster_role_binding: String,
    pub node_pod_security_policy: String,

    pub agent_cluster_role: String,
    pub agent_cluster_role_binding: String,
    pub agent_pod_security_policy: String,

    pub controllers_cluster_role: String,
    pub controllers_cluster_role_binding: String,
    pub controllers_pod_security_policy: String,
}

impl AddonManifests {
    /// Extract the typed manifest set from a rendered chart. Fails on the
    /// first expected key absent from the output.
    pub fn try_from_rendered(chart: &RenderedChart) -> Result<Self, MissingManifestError> {
        let lookup = |key: &'static str| -> Result<String, MissingManifestError> {
            chart
                .manifest(key)
                .map(str::to_string)
                .ok_or(MissingManifestError { key })
        };

        Ok(Self {
            main: lookup(MAIN_KEY)?,
            config: lookup(CONFIG_KEY)?,
            rbac: lookup(RBAC_KEY)?,
            node_cluster_role: lookup(NODE_CLUSTER_ROLE_KEY)?,
            node_cluster_role_binding: lookup(NODE_CLUSTER_ROLE_BINDING_KEY)?,
            node_pod_security_policy: lookup(NODE_POD_SECURITY_POLICY_KEY)?,
            agent_cluster_role: lookup(AGENT_CLUSTER_ROLE_KEY)?,
            agent_cluster_role_binding: lookup(AGENT_CLUSTER_ROLE_BINDING_KEY)?,
            agent_pod_security_policy: lookup(AGENT_POD_SECURITY_POLICY_KEY)?,
            controllers_cluster_role: lookup(CONTROLLERS_CLUSTER_ROLE_KEY)?,
            controllers_cluster_role_binding: lookup(CONTROLLERS_CLUSTER_ROLE_BINDING_KEY)?,
            controllers_pod_security_policy: lookup(CONTROLLERS_POD_SECURITY_POLICY_KEY)?,
        })
    }

    /// Resolve one of the expected keys to its manifest content
    pub fn manifest(&self, key: &str) -> Option<&str> {
        let content = match key {
            MAIN_KEY => &self.main,
            CONFIG_KEY => &self.config,
            RBAC_KEY => &self.rbac,
            NODE_CLUSTER_ROLE_KEY => &self.node_cluster_role,
            NODE_CLUSTER_ROLE_BINDING_KEY => &self.node_cluster_role_binding,
            NODE_POD_SECURITY_POLICY_KEY => &self.node_pod_security_policy,
            AGENT_CLUSTER_ROLE_KEY => &self.agent_cluster_role,
            AGENT_CLUSTER_ROLE_BINDING_KEY => &self.agent_cluster_role_binding,
            AGENT_POD_SECURITY_POLICY_KEY => &self.agent_pod_security_policy,
            CONTROLLERS_CLUSTER_ROLE_KEY => &self.controllers_cluster_role,
            CONTROLLERS_CLUSTER_ROLE_BINDING_KEY => &self.controllers_cluster_role_binding,
            CONTROLLERS_POD_SECURITY_POLICY_KEY => &self.controllers_pod_security_policy,
            _ => return None,
        };
        Some(content.as_str())
    }
}

/// Compute the value document for one reconciliation pass.
///
/// Pure over its inputs: the image table is fixed per build and the output
/// carries no timestamps or generated identifiers, so identical inputs yield
/// structurally equal documents.
pub fn compute_chart_values(network: &Network, config: &NetworkConfig) -> serde_json::Value {
    let mut values = json!({
        "images": {
            "network-addon-cni": images::cni_image(),
            "network-addon-node": images::node_image(),
            "network-addon-agent": images::agent_image(),
            "network-addon-controllers": images::controllers_image(),
        },
        "global": {
            "podCIDR": network.spec.pod_cidr,
        },
    });

    let mut provider = serde_json::Map::new();
    if let Some(backend) = config.backend {
        provider.insert("backend".to_string(), json!(backend.as_str()));
    }
    if let Some(method) = &config.ip_autodetection_method {
        provider.insert("ipAutodetectionMethod".to_string(), json!(method));
    }
    if !provider.is_empty() {
        values["config"] = serde_json::Value::Object(provider);
    }

    values
}

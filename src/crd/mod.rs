//! # Custom Resource Definitions
//!
//! The `Network` resource describes a cluster network add-on instance and is
//! the input to every reconciliation pass. The `ManagedResource` is the
//! output: a single descriptor referencing the secrets that carry the
//! rendered manifests, watched and applied by an external reconciler.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Network add-on resource
///
/// # Example
///
/// ```yaml
/// apiVersion: addons.networking.io/v1alpha1
/// kind: Network
/// metadata:
///   name: shoot-network
///   namespace: shoot--foo--bar
/// spec:
///   podCIDR: 192.168.1.0/24
///   serviceCIDR: 10.0.0.0/8
///   providerConfig:
///     backend: vxlan
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "addons.networking.io",
    version = "v1alpha1",
    kind = "Network",
    namespaced,
    status = "NetworkStatus",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    /// CIDR range assigned to pods
    #[serde(rename = "podCIDR")]
    pub pod_cidr: String,
    /// CIDR range assigned to services
    #[serde(rename = "serviceCIDR")]
    pub service_cidr: String,
    /// Provider-specific configuration, decoded by the reconciliation pass.
    /// Absent means provider defaults apply.
    #[serde(default)]
    pub provider_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// Coarse reconciliation phase (Ready, Failed)
    #[serde(default)]
    pub phase: Option<String>,
    /// Human-readable detail for the current phase
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub observed_generation: Option<i64>,
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
    /// Backend the add-on was rendered with, resolved from providerConfig
    #[serde(default)]
    pub backend: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub r#type: String,
    pub status: String,
    #[serde(default)]
    pub last_transition_time: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Aggregate descriptor referencing the secrets published for one `Network`.
///
/// One-to-one with the `Network` resource, keyed by the same (namespace,
/// name). The applier component watches these objects and reconciles the
/// manifests carried by the referenced secrets against the live cluster.
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "addons.networking.io",
    version = "v1alpha1",
    kind = "ManagedResource",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResourceSpec {
    /// Names of the secrets carrying the rendered manifests
    pub secret_refs: Vec<SecretRef>,
    /// Labels the applier injects into every managed object
    #[serde(default)]
    pub inject_labels: BTreeMap<String, String>,
}

/// Reference to a secret in the same namespace as the managed resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
}

impl SecretRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

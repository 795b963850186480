//! # Provider Configuration
//!
//! Decodes the opaque `providerConfig` blob of a `Network` resource into the
//! typed configuration consumed by value computation. The decoded value is
//! owned by the reconciliation pass and discarded after use.

use crate::crd::Network;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Provider-specific network configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Dataplane backend. Absent means the chart default is used.
    #[serde(default)]
    pub backend: Option<Backend>,
    /// Node address autodetection method handed through to the node daemon
    #[serde(default)]
    pub ip_autodetection_method: Option<String>,
}

/// Supported dataplane backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Bird,
    Vxlan,
    None,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Bird => "bird",
            Backend::Vxlan => "vxlan",
            Backend::None => "none",
        }
    }
}

/// Decode the provider configuration carried by a `Network` resource.
///
/// A missing blob yields the default configuration; a malformed blob is a
/// caller-facing validation error and never reaches the render step.
pub fn network_config_from_resource(network: &Network) -> Result<NetworkConfig> {
    match &network.spec.provider_config {
        Some(raw) => serde_json::from_value(raw.clone())
            .context("failed to decode providerConfig of network resource"),
        None => Ok(NetworkConfig::default()),
    }
}

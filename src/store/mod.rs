//! # Cluster Stores
//!
//! Narrow capabilities over the cluster writes the publication step needs:
//! upsert-by-name for secrets and for the managed-resource descriptor. One
//! production implementation backed by the Kubernetes API; tests substitute
//! recording or fault-injecting implementations.

use crate::crd::SecretRef;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Upsert-by-name store for manifest-carrying secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Create or update the secret at (namespace, name), setting its single
    /// key to the given payload. Re-running with identical content is a
    /// no-op; different content overwrites.
    async fn upsert_secret(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        data: &[u8],
    ) -> Result<()>;
}

/// Upsert-by-name store for the aggregate managed-resource descriptor
#[async_trait]
pub trait ManagedResourceStore: Send + Sync {
    async fn upsert_managed_resource(
        &self,
        namespace: &str,
        name: &str,
        secret_refs: Vec<SecretRef>,
        inject_labels: BTreeMap<String, String>,
    ) -> Result<()>;
}

pub mod kube;

pub use self::kube::KubeStore;

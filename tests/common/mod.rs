//! Shared test doubles for the pipeline capability traits: a canned chart
//! renderer, a recording fault-injectable store and a counting status
//! updater.

use anyhow::Result;
use async_trait::async_trait;
use network_addon_controller::charts::{
    ChartRenderer, Manifest, RenderedChart, EXPECTED_MANIFEST_KEYS,
};
use network_addon_controller::config::NetworkConfig;
use network_addon_controller::crd::{Network, NetworkSpec, SecretRef};
use network_addon_controller::status::StatusUpdater;
use network_addon_controller::store::{ManagedResourceStore, SecretStore};
use kube::core::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub fn test_network() -> Network {
    Network {
        metadata: ObjectMeta {
            name: Some("shoot-network".to_string()),
            namespace: Some("shoot--foo--bar".to_string()),
            ..ObjectMeta::default()
        },
        spec: NetworkSpec {
            pod_cidr: "192.168.1.0/24".to_string(),
            service_cidr: "10.0.0.0/8".to_string(),
            provider_config: None,
        },
        status: None,
    }
}

/// The full rendered chart of the happy path: all 12 expected manifests,
/// each with the same canned content
pub fn full_chart(content: &str) -> RenderedChart {
    RenderedChart {
        chart_name: "test".to_string(),
        manifests: EXPECTED_MANIFEST_KEYS
            .iter()
            .map(|key| Manifest {
                name: format!("test/templates/{key}"),
                content: content.to_string(),
            })
            .collect(),
    }
}

/// Renderer returning a canned chart, or failing outright
pub struct StaticChartRenderer {
    pub chart: RenderedChart,
    pub fail: bool,
}

impl StaticChartRenderer {
    pub fn returning(chart: RenderedChart) -> Self {
        Self { chart, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            chart: RenderedChart::default(),
            fail: true,
        }
    }
}

impl ChartRenderer for StaticChartRenderer {
    fn render(
        &self,
        _chart_path: &str,
        _release_name: &str,
        _namespace: &str,
        _values: &serde_json::Value,
    ) -> Result<RenderedChart> {
        if self.fail {
            anyhow::bail!("renderer unavailable");
        }
        Ok(self.chart.clone())
    }
}

/// One recorded cluster write, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterWrite {
    Secret {
        namespace: String,
        name: String,
        key: String,
        data: Vec<u8>,
    },
    ManagedResource {
        namespace: String,
        name: String,
        secret_refs: Vec<SecretRef>,
        inject_labels: BTreeMap<String, String>,
    },
}

/// In-memory store recording every write and the resulting cluster state.
/// `fail_secret_at` fails the N-th secret upsert (zero-based);
/// `fail_descriptor` fails the managed-resource upsert.
#[derive(Default)]
pub struct RecordingStore {
    pub writes: Mutex<Vec<ClusterWrite>>,
    pub secrets: Mutex<BTreeMap<(String, String), (String, Vec<u8>)>>,
    pub descriptors: Mutex<BTreeMap<(String, String), (Vec<SecretRef>, BTreeMap<String, String>)>>,
    pub fail_secret_at: Option<usize>,
    pub fail_descriptor: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_secret_at(n: usize) -> Self {
        Self {
            fail_secret_at: Some(n),
            ..Self::default()
        }
    }

    pub fn failing_descriptor() -> Self {
        Self {
            fail_descriptor: true,
            ..Self::default()
        }
    }

    pub fn secret_write_count(&self) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| matches!(w, ClusterWrite::Secret { .. }))
            .count()
    }

    pub fn descriptor_write_count(&self) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| matches!(w, ClusterWrite::ManagedResource { .. }))
            .count()
    }
}

#[async_trait]
impl SecretStore for RecordingStore {
    async fn upsert_secret(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        data: &[u8],
    ) -> Result<()> {
        if self.fail_secret_at == Some(self.secret_write_count()) {
            anyhow::bail!("injected secret write failure for {namespace}/{name}");
        }

        self.writes.lock().unwrap().push(ClusterWrite::Secret {
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
            data: data.to_vec(),
        });
        self.secrets.lock().unwrap().insert(
            (namespace.to_string(), name.to_string()),
            (key.to_string(), data.to_vec()),
        );
        Ok(())
    }
}

#[async_trait]
impl ManagedResourceStore for RecordingStore {
    async fn upsert_managed_resource(
        &self,
        namespace: &str,
        name: &str,
        secret_refs: Vec<SecretRef>,
        inject_labels: BTreeMap<String, String>,
    ) -> Result<()> {
        if self.fail_descriptor {
            anyhow::bail!("injected descriptor write failure for {namespace}/{name}");
        }

        self.writes
            .lock()
            .unwrap()
            .push(ClusterWrite::ManagedResource {
                namespace: namespace.to_string(),
                name: name.to_string(),
                secret_refs: secret_refs.clone(),
                inject_labels: inject_labels.clone(),
            });
        self.descriptors.lock().unwrap().insert(
            (namespace.to_string(), name.to_string()),
            (secret_refs, inject_labels),
        );
        Ok(())
    }
}

/// Status updater counting invocations, optionally failing
#[derive(Default)]
pub struct RecordingStatusUpdater {
    pub updates: Mutex<usize>,
    pub fail: bool,
}

impl RecordingStatusUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            updates: Mutex::new(0),
            fail: true,
        }
    }

    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

#[async_trait]
impl StatusUpdater for RecordingStatusUpdater {
    async fn update_status(&self, _network: &Network, _config: &NetworkConfig) -> Result<()> {
        if self.fail {
            anyhow::bail!("injected status update failure");
        }
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }
}

//! # Pipeline Integration Tests
//!
//! Exercises one full reconciliation pass through the capability traits:
//! publication ordering, failure-state taxonomy and idempotence.

mod common;

use common::{
    full_chart, test_network, ClusterWrite, RecordingStatusUpdater, RecordingStore,
    StaticChartRenderer,
};
use network_addon_controller::charts::RenderedChart;
use network_addon_controller::constants::NO_CLEANUP_LABEL;
use network_addon_controller::crd::SecretRef;
use network_addon_controller::packaging::YAML_DOCUMENT_SEPARATOR;
use network_addon_controller::pipeline::{run_pass, Capabilities, Pass, PassError, PassState};

struct Fixture {
    renderer: StaticChartRenderer,
    store: RecordingStore,
    status: RecordingStatusUpdater,
}

impl Fixture {
    fn new() -> Self {
        Self::with_store(RecordingStore::new())
    }

    fn with_store(store: RecordingStore) -> Self {
        Self {
            renderer: StaticChartRenderer::returning(full_chart("test-content")),
            store,
            status: RecordingStatusUpdater::new(),
        }
    }

    fn capabilities(&self) -> Capabilities<'_> {
        Capabilities {
            renderer: &self.renderer,
            secrets: &self.store,
            managed_resources: &self.store,
            status: &self.status,
        }
    }

    async fn run(&self) -> (Pass, Result<(), PassError>) {
        let mut pass = Pass::new();
        let result = run_pass(&mut pass, &self.capabilities(), &test_network()).await;
        (pass, result)
    }
}

#[tokio::test]
async fn test_successful_pass_publishes_four_secrets_and_one_descriptor() {
    let fixture = Fixture::new();
    let (pass, result) = fixture.run().await;

    result.unwrap();
    assert_eq!(pass.state(), PassState::StatusUpdated);
    assert_eq!(fixture.store.secret_write_count(), 4);
    assert_eq!(fixture.store.descriptor_write_count(), 1);
    assert_eq!(fixture.status.update_count(), 1);

    let secrets = fixture.store.secrets.lock().unwrap();
    let namespace = "shoot--foo--bar".to_string();
    for name in [
        "network-addon",
        "network-addon-config",
        "network-addon-rbac",
        "network-addon-psps",
    ] {
        assert!(
            secrets.contains_key(&(namespace.clone(), name.to_string())),
            "secret {name} not published"
        );
    }
}

#[tokio::test]
async fn test_descriptor_references_all_secrets_and_carries_no_cleanup_label() {
    let fixture = Fixture::new();
    let (_, result) = fixture.run().await;
    result.unwrap();

    let descriptors = fixture.store.descriptors.lock().unwrap();
    let (refs, labels) = descriptors
        .get(&("shoot--foo--bar".to_string(), "shoot-network".to_string()))
        .expect("descriptor not published");

    assert_eq!(
        refs,
        &vec![
            SecretRef::new("network-addon"),
            SecretRef::new("network-addon-config"),
            SecretRef::new("network-addon-rbac"),
            SecretRef::new("network-addon-psps"),
        ]
    );
    assert_eq!(labels.get(NO_CLEANUP_LABEL).map(String::as_str), Some("true"));
}

#[tokio::test]
async fn test_policy_bundle_secret_matches_fixed_nine_way_concatenation() {
    let fixture = Fixture::new();
    let (_, result) = fixture.run().await;
    result.unwrap();

    let secrets = fixture.store.secrets.lock().unwrap();
    let (key, data) = secrets
        .get(&("shoot--foo--bar".to_string(), "network-addon-psps".to_string()))
        .expect("bundle secret not published");

    assert_eq!(key, "psps.yaml");
    assert_eq!(
        String::from_utf8(data.clone()).unwrap(),
        vec!["test-content"; 9].join(YAML_DOCUMENT_SEPARATOR)
    );
}

#[tokio::test]
async fn test_descriptor_is_never_written_when_any_secret_write_fails() {
    for failing_write in 0..4 {
        let fixture = Fixture::with_store(RecordingStore::failing_secret_at(failing_write));
        let (pass, result) = fixture.run().await;

        let err = result.unwrap_err();
        assert!(
            matches!(err, PassError::SecretPublication { .. }),
            "write {failing_write}: unexpected error {err}"
        );
        assert_eq!(pass.state(), PassState::Packaged);
        assert_eq!(fixture.store.secret_write_count(), failing_write);
        assert_eq!(
            fixture.store.descriptor_write_count(),
            0,
            "descriptor written despite secret write {failing_write} failing"
        );
        assert_eq!(fixture.status.update_count(), 0);
    }
}

#[tokio::test]
async fn test_descriptor_failure_surfaces_after_secrets_are_published() {
    let fixture = Fixture::with_store(RecordingStore::failing_descriptor());
    let (pass, result) = fixture.run().await;

    let err = result.unwrap_err();
    assert!(matches!(err, PassError::DescriptorPublication { .. }));
    assert!(!err.resources_applied());
    assert_eq!(pass.state(), PassState::SecretsPublished);
    assert_eq!(fixture.store.secret_write_count(), 4);
    assert_eq!(fixture.status.update_count(), 0);
}

#[tokio::test]
async fn test_render_failure_aborts_before_any_cluster_write() {
    let fixture = Fixture {
        renderer: StaticChartRenderer::failing(),
        store: RecordingStore::new(),
        status: RecordingStatusUpdater::new(),
    };
    let (pass, result) = fixture.run().await;

    assert!(matches!(result.unwrap_err(), PassError::Render(_)));
    assert_eq!(pass.state(), PassState::ConfigDecoded);
    assert!(fixture.store.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_manifest_aborts_before_any_cluster_write() {
    let mut chart = full_chart("test-content");
    chart.manifests.retain(|m| !m.name.ends_with("rbac.yaml"));

    let fixture = Fixture {
        renderer: StaticChartRenderer::returning(chart),
        store: RecordingStore::new(),
        status: RecordingStatusUpdater::new(),
    };
    let (pass, result) = fixture.run().await;

    assert!(matches!(
        result.unwrap_err(),
        PassError::MissingManifest(_)
    ));
    assert_eq!(pass.state(), PassState::Rendered);
    assert!(fixture.store.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_failure_is_distinguishable_after_full_publication() {
    let fixture = Fixture {
        renderer: StaticChartRenderer::returning(full_chart("test-content")),
        store: RecordingStore::new(),
        status: RecordingStatusUpdater::failing(),
    };
    let (pass, result) = fixture.run().await;

    let err = result.unwrap_err();
    assert!(matches!(err, PassError::StatusUpdate(_)));
    assert!(err.resources_applied());
    assert_eq!(pass.state(), PassState::DescriptorPublished);
    assert_eq!(fixture.store.secret_write_count(), 4);
    assert_eq!(fixture.store.descriptor_write_count(), 1);
}

#[tokio::test]
async fn test_rerunning_the_pass_is_idempotent() {
    let fixture = Fixture::new();

    let (_, first) = fixture.run().await;
    first.unwrap();
    let secrets_after_first = fixture.store.secrets.lock().unwrap().clone();
    let descriptors_after_first = fixture.store.descriptors.lock().unwrap().clone();

    let (pass, second) = fixture.run().await;
    second.unwrap();

    assert_eq!(pass.state(), PassState::StatusUpdated);
    // every write ran again with overwrite semantics
    assert_eq!(fixture.store.secret_write_count(), 8);
    assert_eq!(fixture.store.descriptor_write_count(), 2);
    // but the final cluster state did not diverge
    assert_eq!(*fixture.store.secrets.lock().unwrap(), secrets_after_first);
    assert_eq!(
        *fixture.store.descriptors.lock().unwrap(),
        descriptors_after_first
    );
}

#[tokio::test]
async fn test_changed_content_overwrites_published_secrets() {
    let fixture = Fixture::new();
    let (_, first) = fixture.run().await;
    first.unwrap();

    let updated = Fixture {
        renderer: StaticChartRenderer::returning(full_chart("updated-content")),
        store: fixture.store,
        status: RecordingStatusUpdater::new(),
    };
    let (_, second) = updated.run().await;
    second.unwrap();

    let secrets = updated.store.secrets.lock().unwrap();
    let (_, data) = secrets
        .get(&("shoot--foo--bar".to_string(), "network-addon".to_string()))
        .unwrap();
    assert_eq!(data, b"updated-content");
}

#[tokio::test]
async fn test_secret_writes_happen_in_package_order() {
    let fixture = Fixture::new();
    let (_, result) = fixture.run().await;
    result.unwrap();

    let writes = fixture.store.writes.lock().unwrap();
    let secret_names: Vec<&str> = writes
        .iter()
        .filter_map(|w| match w {
            ClusterWrite::Secret { name, .. } => Some(name.as_str()),
            ClusterWrite::ManagedResource { .. } => None,
        })
        .collect();

    assert_eq!(
        secret_names,
        vec![
            "network-addon",
            "network-addon-config",
            "network-addon-rbac",
            "network-addon-psps"
        ]
    );
    // the descriptor is the last write of the pass
    assert!(matches!(
        writes.last().unwrap(),
        ClusterWrite::ManagedResource { .. }
    ));
}

#[tokio::test]
async fn test_invalid_provider_config_fails_validation_without_rendering() {
    let mut network = test_network();
    network.spec.provider_config = Some(serde_json::json!({ "backend": "wireguard" }));

    let fixture = Fixture::new();
    let mut pass = Pass::new();
    let result = run_pass(&mut pass, &fixture.capabilities(), &network).await;

    assert!(matches!(result.unwrap_err(), PassError::Validation(_)));
    assert_eq!(pass.state(), PassState::Start);
    assert!(fixture.store.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_render_receives_chart_identity_and_computed_values() {
    // a renderer that asserts on its inputs
    struct AssertingRenderer;

    impl network_addon_controller::charts::ChartRenderer for AssertingRenderer {
        fn render(
            &self,
            chart_path: &str,
            release_name: &str,
            namespace: &str,
            values: &serde_json::Value,
        ) -> anyhow::Result<RenderedChart> {
            assert_eq!(chart_path, "charts/network-addon");
            assert_eq!(release_name, "network-addon");
            assert_eq!(namespace, "kube-system");
            assert_eq!(values["global"]["podCIDR"], "192.168.1.0/24");
            Ok(full_chart("test-content"))
        }
    }

    let store = RecordingStore::new();
    let status = RecordingStatusUpdater::new();
    let caps = Capabilities {
        renderer: &AssertingRenderer,
        secrets: &store,
        managed_resources: &store,
        status: &status,
    };

    let mut pass = Pass::new();
    run_pass(&mut pass, &caps, &test_network()).await.unwrap();
    assert_eq!(pass.state(), PassState::StatusUpdated);
}

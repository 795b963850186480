//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! The secret names, the policy bundle key and the no-cleanup label form the
//! naming contract with the external applier that consumes the published
//! `ManagedResource`. They must not change between releases.

/// Path to the add-on chart handed to the chart renderer
pub const CHART_PATH: &str = "charts/network-addon";

/// Release name used when rendering the add-on chart
pub const RELEASE_NAME: &str = "network-addon";

/// Namespace the rendered manifests target on the workload cluster
pub const RENDER_NAMESPACE: &str = "kube-system";

/// Secret carrying the main add-on manifest (daemon sets, deployments)
pub const MAIN_SECRET_NAME: &str = "network-addon";

/// Secret carrying the add-on config map manifest
pub const CONFIG_SECRET_NAME: &str = "network-addon-config";

/// Secret carrying the RBAC manifest
pub const RBAC_SECRET_NAME: &str = "network-addon-rbac";

/// Secret carrying the concatenated pod security policy bundle
pub const POLICY_SECRET_NAME: &str = "network-addon-psps";

/// Label injected into the managed resource so the applier never
/// garbage-collects the add-on objects behind the cluster's back
pub const NO_CLEANUP_LABEL: &str = "addons.networking.io/no-cleanup";

/// Field manager for server-side apply patches
pub const FIELD_MANAGER: &str = "network-addon-controller";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Requeue interval after a successful pass (periodic resync)
pub const DEFAULT_RESYNC_SECS: u64 = 300;

/// Requeue interval after a failed pass; the watch layer owns retries,
/// the pipeline itself never retries internally
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

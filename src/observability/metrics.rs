//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `network_addon_reconciliations_total` - Total number of reconciliation passes
//! - `network_addon_reconciliation_errors_total` - Total number of failed passes
//! - `network_addon_reconciliation_duration_seconds` - Duration of successful passes
//! - `network_addon_secrets_published_total` - Total number of secret upserts
//! - `network_addon_managed_resources_published_total` - Total number of descriptor upserts
//! - `network_addon_chart_render_errors_total` - Total number of chart render failures
//! - `network_addon_chart_render_duration_seconds` - Duration of chart render calls

use anyhow::Result;
use prometheus::{Histogram, IntCounter, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "network_addon_reconciliations_total",
        "Total number of reconciliation passes",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "network_addon_reconciliation_errors_total",
        "Total number of failed reconciliation passes",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "network_addon_reconciliation_duration_seconds",
            "Duration of successful reconciliation passes in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static SECRETS_PUBLISHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "network_addon_secrets_published_total",
        "Total number of manifest secret upserts",
    )
    .expect("Failed to create SECRETS_PUBLISHED_TOTAL metric - this should never happen")
});

static MANAGED_RESOURCES_PUBLISHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "network_addon_managed_resources_published_total",
        "Total number of managed resource upserts",
    )
    .expect("Failed to create MANAGED_RESOURCES_PUBLISHED_TOTAL metric - this should never happen")
});

static CHART_RENDER_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "network_addon_chart_render_errors_total",
        "Total number of chart render failures",
    )
    .expect("Failed to create CHART_RENDER_ERRORS_TOTAL metric - this should never happen")
});

static CHART_RENDER_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "network_addon_chart_render_duration_seconds",
            "Duration of chart render calls in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create CHART_RENDER_DURATION metric - this should never happen")
});

/// Register all metrics with the registry. Call once at startup.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(SECRETS_PUBLISHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(MANAGED_RESOURCES_PUBLISHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CHART_RENDER_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CHART_RENDER_DURATION.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(seconds: f64) {
    RECONCILIATION_DURATION.observe(seconds);
}

pub fn increment_secrets_published() {
    SECRETS_PUBLISHED_TOTAL.inc();
}

pub fn increment_managed_resources_published() {
    MANAGED_RESOURCES_PUBLISHED_TOTAL.inc();
}

pub fn increment_chart_render_errors() {
    CHART_RENDER_ERRORS_TOTAL.inc();
}

pub fn observe_chart_render_duration(seconds: f64) {
    CHART_RENDER_DURATION.observe(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1);
    }
}

//! # Chart Renderer Capability
//!
//! Narrow contract over template expansion. The pipeline only depends on
//! this trait; chart-engine internals live behind it and rendering failures
//! surface to the caller unmodified.

use anyhow::Result;

/// A single named unit of rendered manifest content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Source-relative name, e.g. `network-addon/templates/config.yaml`
    pub name: String,
    pub content: String,
}

/// Flat list of named manifests produced by one render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedChart {
    pub chart_name: String,
    pub manifests: Vec<Manifest>,
}

impl RenderedChart {
    /// Look up a manifest by its template key. Manifest names carry a
    /// chart-relative prefix, so a key matches when the name equals it or
    /// ends with `/<key>`.
    pub fn manifest(&self, key: &str) -> Option<&str> {
        self.manifests
            .iter()
            .find(|m| m.name == key || m.name.ends_with(&format!("/{key}")))
            .map(|m| m.content.as_str())
    }
}

/// External rendering capability consumed by the reconciliation pass
pub trait ChartRenderer: Send + Sync {
    fn render(
        &self,
        chart_path: &str,
        release_name: &str,
        namespace: &str,
        values: &serde_json::Value,
    ) -> Result<RenderedChart>;
}

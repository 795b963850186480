//! # Helm Renderer
//!
//! Production `ChartRenderer` implementation that executes `helm template`
//! and reassembles the output into named manifests using the `# Source:`
//! comments helm emits for every document.

use crate::charts::renderer::{ChartRenderer, Manifest, RenderedChart};
use crate::observability::metrics;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct HelmChartRenderer {
    helm_bin: String,
}

impl HelmChartRenderer {
    pub fn new() -> Self {
        Self {
            helm_bin: "helm".to_string(),
        }
    }

    pub fn with_binary(helm_bin: impl Into<String>) -> Self {
        Self {
            helm_bin: helm_bin.into(),
        }
    }
}

impl Default for HelmChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for HelmChartRenderer {
    fn render(
        &self,
        chart_path: &str,
        release_name: &str,
        namespace: &str,
        values: &serde_json::Value,
    ) -> Result<RenderedChart> {
        let start = Instant::now();

        if !Path::new(chart_path).exists() {
            metrics::increment_chart_render_errors();
            return Err(anyhow::anyhow!("chart path does not exist: {chart_path}"));
        }

        // helm only takes values from files or repeated --set flags; a
        // scratch file keeps the full nested document intact
        let mut values_file =
            tempfile::NamedTempFile::new().context("failed to create chart values file")?;
        let rendered_values =
            serde_yaml::to_string(values).context("failed to serialize chart values")?;
        values_file
            .write_all(rendered_values.as_bytes())
            .context("failed to write chart values file")?;

        info!(
            "Rendering chart {} as release {} into namespace {}",
            chart_path, release_name, namespace
        );

        let output = Command::new(&self.helm_bin)
            .arg("template")
            .arg(release_name)
            .arg(chart_path)
            .arg("--namespace")
            .arg(namespace)
            .arg("--values")
            .arg(values_file.path())
            .output()
            .context("failed to execute helm template")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("helm template failed: {}", stderr);
            metrics::increment_chart_render_errors();
            return Err(anyhow::anyhow!("helm template failed: {stderr}"));
        }

        let stdout =
            String::from_utf8(output.stdout).context("failed to decode helm output as UTF-8")?;

        let chart_name = Path::new(chart_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| chart_path.to_string());

        let manifests = parse_helm_output(&stdout);
        debug!("Rendered {} manifests from {}", manifests.len(), chart_path);
        metrics::observe_chart_render_duration(start.elapsed().as_secs_f64());

        Ok(RenderedChart {
            chart_name,
            manifests,
        })
    }
}

/// Split the helm output stream into named manifests.
///
/// Documents are separated by `---` lines; each document opens with a
/// `# Source: <chart>/templates/<file>` comment. Documents rendered from the
/// same template file are concatenated back into one manifest, separated by
/// a YAML document marker.
fn parse_helm_output(output: &str) -> Vec<Manifest> {
    const SOURCE_PREFIX: &str = "# Source:";

    let mut manifests: Vec<Manifest> = Vec::new();

    for doc in output.split("\n---") {
        let mut name = None;
        let mut content_lines = Vec::new();

        for line in doc.lines() {
            if line.trim() == "---" {
                continue;
            }
            if let Some(rest) = line.strip_prefix(SOURCE_PREFIX) {
                name = Some(rest.trim().to_string());
                continue;
            }
            content_lines.push(line);
        }

        let content = content_lines.join("\n").trim().to_string();
        let Some(name) = name else { continue };
        if content.is_empty() {
            continue;
        }

        match manifests.iter_mut().find(|m| m.name == name) {
            Some(existing) => {
                existing.content.push_str("\n---\n");
                existing.content.push_str(&content);
            }
            None => manifests.push(Manifest { name, content }),
        }
    }

    manifests
}

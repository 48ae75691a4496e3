//! Chart.yaml metadata

use crate::domain::ChartInfo;
use crate::error::DeclarationError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the chart metadata file
pub const CHART_FILE: &str = "Chart.yaml";

#[derive(Debug, Default, Deserialize)]
struct ChartMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Check that a directory holds a readable Chart.yaml
pub fn validate_chart_path(chart_dir: &Path) -> Result<PathBuf, DeclarationError> {
    let chart_file = chart_dir.join(CHART_FILE);
    std::fs::read_to_string(&chart_file).map_err(|_| {
        DeclarationError::invalid_chart(chart_dir, "Chart.yaml not found or not readable")
    })?;
    Ok(chart_file)
}

/// Read the chart name and version from Chart.yaml
pub fn read_chart_info(chart_dir: &Path) -> Result<ChartInfo, DeclarationError> {
    let chart_file = chart_dir.join(CHART_FILE);
    let content = std::fs::read_to_string(&chart_file).map_err(|e| {
        DeclarationError::invalid_chart(chart_dir, format!("failed to read Chart.yaml: {e}"))
    })?;

    let metadata: ChartMetadata = if content.trim().is_empty() {
        ChartMetadata::default()
    } else {
        serde_yaml::from_str(&content).map_err(|e| {
            DeclarationError::invalid_chart(chart_dir, format!("failed to parse Chart.yaml: {e}"))
        })?
    };

    let name = metadata.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(DeclarationError::invalid_chart(
            chart_dir,
            "chart name is required in Chart.yaml",
        ));
    }

    let version = metadata.version.unwrap_or_default().trim().to_string();
    if version.is_empty() {
        return Err(DeclarationError::invalid_chart(
            chart_dir,
            "chart version is required in Chart.yaml",
        ));
    }

    Ok(ChartInfo::new(name, version))
}

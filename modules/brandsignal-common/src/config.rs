use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::BrandSignalError;

/// TOML-backed configuration for a batch run.
///
/// Only the outer stages are tunable. Keyword tables, signal weights, and the
/// burst window are fixed in the analysis crate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub intake: IntakeConfig,
    pub report: ReportConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), BrandSignalError> {
        let threshold = self.report.high_suspicion_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BrandSignalError::Config(format!(
                "report.high_suspicion_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.report.recent_window_days <= 0 {
            return Err(BrandSignalError::Config(format!(
                "report.recent_window_days must be positive, got {}",
                self.report.recent_window_days
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Items must mention one of these (case-insensitive) to be kept.
    /// Empty disables the relevance gate.
    pub brand_terms: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            brand_terms: vec!["qobuz".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub high_suspicion_threshold: f64,
    pub recent_window_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_suspicion_threshold: 0.6,
            recent_window_days: 7,
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

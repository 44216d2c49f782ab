//! Configuration structures for the retail sales pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the reporting run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ingestion configuration.
    pub ingest: IngestConfig,
    /// Cleaning configuration.
    pub cleaning: CleaningConfig,
    /// Aggregation and co-occurrence configuration.
    pub analysis: AnalysisConfig,
    /// Report configuration.
    pub report: ReportConfig,
}

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(format!(
                "config file '{}' does not exist",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.file_extension.trim().is_empty() {
            return Err(Error::config("ingest.file_extension must not be empty"));
        }
        if self.cleaning.header_sentinel.is_empty() {
            return Err(Error::config("cleaning.header_sentinel must not be empty"));
        }
        if self.analysis.top_pairs == 0 {
            return Err(Error::config("analysis.top_pairs must be at least 1"));
        }
        if self.report.currency_precision > 6 {
            return Err(Error::config("report.currency_precision must be at most 6"));
        }
        Ok(())
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory holding one source file per reporting period.
    pub input_dir: PathBuf,
    /// Extension of source files (without the dot).
    pub file_extension: String,
    /// Where to persist the unified (pre-cleaning) table, if anywhere.
    pub unified_output: Option<PathBuf>,
    /// Where to persist the consolidated augmented table, if anywhere.
    pub consolidated_output: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./Sales_Data"),
            file_extension: "csv".to_string(),
            unified_output: None,
            consolidated_output: None,
        }
    }
}

/// Cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Prefix of `Order Date` that marks a re-ingested header row.
    pub header_sentinel: String,
    /// Number of dropped rows kept as samples per category.
    pub max_samples: usize,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            header_sentinel: "Or".to_string(),
            max_samples: 5,
        }
    }
}

/// Aggregation and co-occurrence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of product pairs reported as most often sold together.
    pub top_pairs: usize,
    /// Count (A, A) pairs from repeated lines of the same product.
    pub keep_self_pairs: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_pairs: 13,
            keep_self_pairs: true,
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimal places for currency values in the report.
    pub currency_precision: u32,
    /// Number of hours listed as peak ordering times.
    pub peak_hours: usize,
    /// Number of multi-line orders listed next to the pair counts.
    pub grouped_samples: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_precision: 2,
            peak_hours: 2,
            grouped_samples: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cleaning.header_sentinel, "Or");
        assert_eq!(config.analysis.top_pairs, 13);
        assert!(config.analysis.keep_self_pairs);
        assert_eq!(config.report.currency_precision, 2);
        assert_eq!(config.report.grouped_samples, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"analysis": {{"top_pairs": 5}}}}"#).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.analysis.top_pairs, 5);
        assert!(config.analysis.keep_self_pairs);
        assert_eq!(config.ingest.file_extension, "csv");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.analysis.top_pairs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

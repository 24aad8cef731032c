//! Configuration loading.

use crate::commands::Cli;
use fib_trace::{ExporterConfig, FileExportConfig, OtlpConfig, TracingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FibConfig {
    /// Default diagnostics filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Span export settings.
    #[serde(default)]
    pub tracing: TracingConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FibConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tracing: TracingConfig::default(),
        }
    }
}

impl FibConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configuration file (if any) with command-line overrides applied.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(cli);
        Ok(config)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }

        if let Some(path) = &cli.traces {
            let file = match &self.tracing.exporter {
                ExporterConfig::File(file) => file.clone(),
                _ => FileExportConfig::default(),
            };
            self.tracing.exporter = ExporterConfig::File(FileExportConfig {
                path: path.clone(),
                ..file
            });
        }

        if let Some(endpoint) = &cli.otlp_endpoint {
            let otlp = match &self.tracing.exporter {
                ExporterConfig::Otlp(otlp) => otlp.clone(),
                _ => OtlpConfig::default(),
            };
            self.tracing.exporter = ExporterConfig::Otlp(OtlpConfig {
                endpoint: endpoint.clone(),
                ..otlp
            });
        }

        if cli.no_traces {
            self.tracing.enabled = false;
        }
    }
}

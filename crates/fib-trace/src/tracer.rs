//! Tracer provider construction and configuration.

use crate::exporter::JsonSpanExporter;
use crate::spans::INSTRUMENTATION_NAME;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler, Tracer, TracerProvider},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Failed to initialize tracer: {0}")]
    Init(String),
    #[error("Failed to open trace output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to shut down tracer: {0}")]
    Shutdown(String),
}

/// File exporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileExportConfig {
    /// Destination file, truncated when the exporter is created.
    #[serde(default = "default_trace_path")]
    pub path: PathBuf,
    /// Pretty print each span document.
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Include span start and end times.
    #[serde(default)]
    pub timestamps: bool,
}

fn default_trace_path() -> PathBuf {
    PathBuf::from("traces.txt")
}

fn default_true() -> bool {
    true
}

impl Default for FileExportConfig {
    fn default() -> Self {
        Self {
            path: default_trace_path(),
            pretty: true,
            timestamps: false,
        }
    }
}

/// OTLP exporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtlpConfig {
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_otlp_timeout")]
    pub timeout_seconds: u64,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otlp_timeout() -> u64 {
    10
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_otlp_endpoint(),
            timeout_seconds: default_otlp_timeout(),
        }
    }
}

/// Where finished spans go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExporterConfig {
    File(FileExportConfig),
    Otlp(OtlpConfig),
    None,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        ExporterConfig::File(FileExportConfig::default())
    }
}

/// Tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub sample_rate: f64,
    pub exporter: ExporterConfig,
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "fib".to_string(),
            service_version: "v0.1.0".to_string(),
            environment: "demo".to_string(),
            sample_rate: 1.0,
            exporter: ExporterConfig::default(),
            resource_attributes: HashMap::new(),
        }
    }
}

/// Build the tracer provider described by `config`.
///
/// The provider is returned to the caller rather than installed globally.
/// Exporting uses a batch processor on the tokio runtime, so this must be
/// called from within one.
pub fn init_tracer(config: &TracingConfig) -> Result<TracerProvider, TracerError> {
    let mut builder = TracerProvider::builder()
        .with_sampler(sampler(config.sample_rate))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(build_resource(config));

    if config.enabled {
        builder = match &config.exporter {
            ExporterConfig::File(file) => {
                let exporter = JsonSpanExporter::create(file)?;
                tracing::debug!(path = %file.path.display(), "Exporting spans to file");
                builder.with_batch_exporter(exporter, runtime::Tokio)
            }
            ExporterConfig::Otlp(otlp) => {
                let exporter = otlp_exporter(otlp)?;
                tracing::debug!(endpoint = %otlp.endpoint, "Exporting spans over OTLP");
                builder.with_batch_exporter(exporter, runtime::Tokio)
            }
            ExporterConfig::None => builder,
        };
    }

    Ok(builder.build())
}

/// The tracer used by the application, named after the instrumentation library.
pub fn tracer(provider: &TracerProvider) -> Tracer {
    provider.tracer(INSTRUMENTATION_NAME)
}

/// Flush pending spans and shut the provider down.
pub fn shutdown_tracer(provider: &TracerProvider) -> Result<(), TracerError> {
    provider
        .shutdown()
        .map_err(|e| TracerError::Shutdown(e.to_string()))
}

fn sampler(sample_rate: f64) -> Sampler {
    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

fn build_resource(config: &TracingConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
        KeyValue::new("environment", config.environment.clone()),
    ];

    for (key, value) in &config.resource_attributes {
        attrs.push(KeyValue::new(key.clone(), value.clone()));
    }

    Resource::default().merge(&Resource::new(attrs))
}

fn otlp_exporter(config: &OtlpConfig) -> Result<opentelemetry_otlp::SpanExporter, TracerError> {
    opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| TracerError::Init(e.to_string()))
}

/// Install the console log subscriber.
///
/// Logs go to stderr; stdout belongs to the application's prompt and
/// results. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

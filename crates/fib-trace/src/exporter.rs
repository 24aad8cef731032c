//! JSON span exporter.
//!
//! Each finished span is written as one JSON document. Documents are
//! separated by whitespace, so the output can be read back with a streaming
//! deserializer regardless of pretty printing.

use crate::tracer::FileExportConfig;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::SystemTime;

/// Span status as written to the trace output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SpanStatus {
    Unset,
    Ok,
    Error { description: String },
}

impl From<&Status> for SpanStatus {
    fn from(status: &Status) -> Self {
        match status {
            Status::Unset => SpanStatus::Unset,
            Status::Ok => SpanStatus::Ok,
            Status::Error { description } => SpanStatus::Error {
                description: description.to_string(),
            },
        }
    }
}

/// One exported span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    pub name: String,
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SpanStatus,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub resource: BTreeMap<String, String>,
}

impl SpanRecord {
    fn from_span(span: &SpanData, resource: &BTreeMap<String, String>, timestamps: bool) -> Self {
        let parent_span_id = (span.parent_span_id != SpanId::INVALID)
            .then(|| span.parent_span_id.to_string());
        let time = |t: SystemTime| timestamps.then(|| DateTime::<Utc>::from(t));

        Self {
            name: span.name.to_string(),
            trace_id: span.span_context.trace_id().to_string(),
            span_id: span.span_context.span_id().to_string(),
            parent_span_id,
            kind: format!("{:?}", span.span_kind),
            start_time: time(span.start_time),
            end_time: time(span.end_time),
            status: SpanStatus::from(&span.status),
            attributes: span
                .attributes
                .iter()
                .map(|kv| (kv.key.to_string(), kv.value.to_string()))
                .collect(),
            events: span.events.iter().map(|e| e.name.to_string()).collect(),
            resource: resource.clone(),
        }
    }
}

/// Read back every span document from exporter output.
pub fn read_records(bytes: &[u8]) -> serde_json::Result<Vec<SpanRecord>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<SpanRecord>()
        .collect()
}

/// Exports spans as JSON documents to any writer.
pub struct JsonSpanExporter {
    writer: Box<dyn Write + Send + Sync>,
    pretty: bool,
    timestamps: bool,
    resource: BTreeMap<String, String>,
}

impl JsonSpanExporter {
    /// Create an exporter writing to `writer`.
    pub fn new(writer: impl Write + Send + Sync + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            pretty: true,
            timestamps: false,
            resource: BTreeMap::new(),
        }
    }

    /// Create (or truncate) the configured file and export into it.
    pub fn create(config: &FileExportConfig) -> std::io::Result<Self> {
        let file = File::create(&config.path)?;
        Ok(Self::new(BufWriter::new(file))
            .with_pretty(config.pretty)
            .with_timestamps(config.timestamps))
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    fn write_batch(&mut self, batch: &[SpanData]) -> std::io::Result<()> {
        for span in batch {
            let record = SpanRecord::from_span(span, &self.resource, self.timestamps);
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &record)?;
            } else {
                serde_json::to_writer(&mut self.writer, &record)?;
            }
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

impl fmt::Debug for JsonSpanExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSpanExporter")
            .field("pretty", &self.pretty)
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

impl SpanExporter for JsonSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = self
            .write_batch(&batch)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "Failed to flush span output");
        }
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
    }
}

//! OpenTelemetry integration for fib.
//!
//! Builds the tracer provider (resource, sampler, exporter), exports
//! finished spans as JSON documents, and provides scope guards that end
//! their span on every exit path.

pub mod exporter;
pub mod spans;
pub mod tracer;

pub use exporter::{JsonSpanExporter, SpanRecord, SpanStatus, read_records};
pub use spans::{FIBONACCI, INSTRUMENTATION_NAME, POLL, REQUEST_N, RUN, SpanScope, WRITE, request_n};
pub use tracer::{
    ExporterConfig, FileExportConfig, OtlpConfig, TracerError, TracingConfig, init_logging,
    init_tracer, shutdown_tracer, tracer,
};

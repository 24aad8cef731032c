//! Span names, attributes and scope guards for the run loop.

use opentelemetry::trace::{Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::Tracer;

/// Instrumentation library name reported by every span.
pub const INSTRUMENTATION_NAME: &str = "fibonacci-with-otel";

/// One iteration of the run loop.
pub const RUN: &str = "Run";
/// Reading one number from the input.
pub const POLL: &str = "Poll";
/// Computing and reporting a result.
pub const WRITE: &str = "Write";
/// The Fibonacci computation itself.
pub const FIBONACCI: &str = "Fibonacci";

/// Attribute carrying the requested index.
pub const REQUEST_N: &str = "request.n";

/// The requested index, as a decimal string so it survives exporters that
/// only carry signed 64-bit integers.
pub fn request_n(n: u64) -> KeyValue {
    KeyValue::new(REQUEST_N, n.to_string())
}

/// A started span that ends when the scope is dropped.
///
/// The span is ended exactly once, whichever way the enclosing function
/// returns. Children are started from [`SpanScope::context`].
pub struct SpanScope {
    cx: Context,
}

impl SpanScope {
    /// Start `name` as a child of whatever span `parent` carries.
    pub fn start(tracer: &Tracer, name: &'static str, parent: &Context) -> Self {
        let span = tracer.start_with_context(name, parent);
        Self {
            cx: parent.with_span(span),
        }
    }

    /// Context to parent child spans on.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Record `err` as an exception event and mark the span as failed.
    pub fn record_failure(&self, err: &(dyn std::error::Error + 'static)) {
        let span = self.cx.span();
        span.record_error(err);
        span.set_status(Status::error(err.to_string()));
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

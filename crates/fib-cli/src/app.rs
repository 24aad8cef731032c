//! The interactive run loop.

use fib_core::{Error, Result, fibonacci};
use fib_trace::{FIBONACCI, POLL, RUN, SpanScope, WRITE, request_n};
use opentelemetry::Context;
use opentelemetry_sdk::trace::Tracer;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub const PROMPT: &str = "What fibonacci no would you like to know?";

/// Reads numbers from `input` and reports their Fibonacci values to `output`.
pub struct App<R, W> {
    input: R,
    output: W,
    tracer: Tracer,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(input: R, output: W, tracer: Tracer) -> Self {
        Self {
            input,
            output,
            tracer,
        }
    }

    /// Poll and report until the input fails.
    ///
    /// Every iteration gets its own `Run` span under `cx`. Only input
    /// failures end the loop; overflows are reported and the loop carries on.
    pub fn run(&mut self, cx: &Context) -> Result<()> {
        loop {
            let run = SpanScope::start(&self.tracer, RUN, cx);
            let n = self.poll(run.context())?;
            self.write(run.context(), n);
        }
    }

    /// Prompt for and read one number.
    pub fn poll(&mut self, cx: &Context) -> Result<u64> {
        let span = SpanScope::start(&self.tracer, POLL, cx);
        self.say(PROMPT);

        match read_number(&mut self.input) {
            Ok(n) => {
                span.set_attribute(request_n(n));
                debug!(n, "Polled input");
                Ok(n)
            }
            Err(e) => {
                span.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Compute `fibonacci(n)` and report the value or the failure.
    pub fn write(&mut self, cx: &Context, n: u64) {
        let span = SpanScope::start(&self.tracer, WRITE, cx);

        let result = {
            let fib = SpanScope::start(&self.tracer, FIBONACCI, span.context());
            fibonacci(n).inspect_err(|e| fib.record_failure(e))
        };

        match result {
            Ok(value) => self.say(&format!("fibonacci({n}) = {value}")),
            Err(e) => {
                debug!(n, error = %e, "Fibonacci failed");
                self.say(&format!("fibonacci({n}) = {e}"));
            }
        }
    }

    fn say(&mut self, line: &str) {
        let written = writeln!(self.output, "{line}").and_then(|()| self.output.flush());
        if let Err(e) = written {
            warn!(error = %e, "Failed to write output");
        }
    }
}

/// Read one line and parse it as a non-negative decimal integer.
fn read_number(input: &mut impl BufRead) -> Result<u64> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::EndOfInput);
    }

    let token = line.trim();
    token.parse().map_err(|source| Error::InvalidInput {
        input: token.to_string(),
        source,
    })
}

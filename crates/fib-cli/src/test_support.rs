//! Shared fixtures for the binary's tests.

use fib_trace::{JsonSpanExporter, SpanRecord, read_records};
use opentelemetry_sdk::trace::TracerProvider;
use std::io::{self, BufRead, Cursor, Read, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// A cloneable in-memory writer.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A provider exporting every span synchronously into a buffer.
pub fn recording_provider() -> (TracerProvider, SharedBuffer) {
    let spans = SharedBuffer::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(JsonSpanExporter::new(spans.clone()).with_pretty(false))
        .build();
    (provider, spans)
}

pub fn exported(spans: &SharedBuffer) -> Vec<SpanRecord> {
    read_records(&spans.bytes()).unwrap()
}

/// Input that serves `data`, then blocks until `release` is sent or dropped,
/// then reports end of input.
pub struct BlockingInput {
    data: Cursor<Vec<u8>>,
    gate: mpsc::Receiver<()>,
}

impl BlockingInput {
    pub fn new(data: &str) -> (Self, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let input = Self {
            data: Cursor::new(data.as_bytes().to_vec()),
            gate,
        };
        (input, release)
    }

    fn exhausted(&self) -> bool {
        self.data.position() >= self.data.get_ref().len() as u64
    }
}

impl Read for BlockingInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for BlockingInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.exhausted() {
            let _ = self.gate.recv();
        }
        self.data.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.data.consume(amt);
    }
}

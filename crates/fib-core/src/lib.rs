//! fib core
//!
//! Error vocabulary and the Fibonacci function shared by the tracing
//! integration and the `fib` binary. This crate has no I/O and no
//! telemetry dependencies.

pub mod error;
pub mod fibonacci;

pub use error::{Error, Result};
pub use fibonacci::{MAX_INDEX, fibonacci};

//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fib")]
#[command(author, version, about = "Compute Fibonacci numbers, tracing every step", long_about = None)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write spans as JSON to this file.
    #[arg(long, conflicts_with = "otlp_endpoint")]
    pub traces: Option<PathBuf>,

    /// Export spans over OTLP/gRPC to this endpoint.
    #[arg(long)]
    pub otlp_endpoint: Option<String>,

    /// Create spans but do not export them.
    #[arg(long)]
    pub no_traces: bool,

    /// Log filter for diagnostics on stderr (overridden by RUST_LOG).
    #[arg(long)]
    pub log_level: Option<String>,
}

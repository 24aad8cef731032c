//! fib entrypoint.

use clap::Parser;
use opentelemetry::Context;
use std::io;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod app;
mod commands;
mod config;
mod lifecycle;

#[cfg(test)]
mod app_tests;
#[cfg(test)]
mod test_support;

use app::App;
use commands::Cli;
use config::FibConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match FibConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            fib_trace::init_logging("info");
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    fib_trace::init_logging(&config.log_level);

    let provider = match fib_trace::init_tracer(&config.tracing) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to initialize tracing");
            return ExitCode::FAILURE;
        }
    };
    let tracer = fib_trace::tracer(&provider);
    info!(
        service = %config.tracing.service_name,
        version = %config.tracing.service_version,
        "Starting"
    );

    let outcome = lifecycle::spawn_worker(move || {
        let mut app = App::new(io::stdin().lock(), io::stdout(), tracer);
        app.run(&Context::new())
    });

    let shutdown = match outcome {
        Ok(outcome) => lifecycle::wait_for_shutdown(tokio::signal::ctrl_c(), outcome).await,
        Err(e) => {
            error!(error = %e, "Failed to start run loop");
            lifecycle::Shutdown::Aborted
        }
    };
    shutdown.report(&mut io::stdout());

    // Batch export waits on the runtime, so flush from a blocking thread.
    let flushing = provider.clone();
    match tokio::task::spawn_blocking(move || fib_trace::shutdown_tracer(&flushing)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Failed to flush traces"),
        Err(e) => warn!(error = %e, "Trace flush task failed"),
    }

    shutdown.exit_code()
}

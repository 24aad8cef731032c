//! Background execution of the run loop and shutdown arbitration.

use fib_core::{Error, Result};
use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use std::thread;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Why the process is stopping.
#[derive(Debug)]
pub enum Shutdown {
    /// An interrupt arrived first.
    Interrupted,
    /// The run loop returned without an error.
    Completed,
    /// The run loop failed.
    Failed(Error),
    /// The run loop went away without reporting, e.g. it panicked.
    Aborted,
}

impl Shutdown {
    pub fn is_success(&self) -> bool {
        matches!(self, Shutdown::Interrupted | Shutdown::Completed)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Log the outcome and write the user-facing farewell or error.
    pub fn report(&self, out: &mut impl Write) {
        let written = match self {
            Shutdown::Interrupted => {
                info!("Interrupted, shutting down");
                writeln!(out, "\ngoodbye")
            }
            Shutdown::Completed => {
                info!("Run loop completed");
                Ok(())
            }
            Shutdown::Failed(e) => {
                error!(error = %e, "Run loop failed");
                writeln!(out, "{e}")
            }
            Shutdown::Aborted => {
                error!("Run loop exited without a result");
                writeln!(out, "run loop exited without a result")
            }
        };
        if let Err(e) = written.and_then(|()| out.flush()) {
            warn!(error = %e, "Failed to write shutdown message");
        }
    }
}

/// Run `work` on its own thread and deliver its result through a oneshot.
///
/// The work blocks on stdin, so it gets a plain thread: the tokio runtime
/// waits for its own blocking tasks when it shuts down.
pub fn spawn_worker<F>(work: F) -> std::io::Result<oneshot::Receiver<Result<()>>>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name("fib-run-loop".to_string())
        .spawn(move || {
            // The receiver is gone once shutdown has been decided.
            let _ = tx.send(work());
        })?;
    Ok(rx)
}

/// Wait for an interrupt or the worker's outcome, whichever comes first.
///
/// The worker is not cancelled on interrupt; process exit reclaims it.
pub async fn wait_for_shutdown<S>(interrupt: S, outcome: oneshot::Receiver<Result<()>>) -> Shutdown
where
    S: Future<Output = std::io::Result<()>>,
{
    let interrupt = async move {
        if let Err(e) = interrupt.await {
            warn!(error = %e, "Cannot listen for interrupts");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = interrupt => Shutdown::Interrupted,
        result = outcome => match result {
            Ok(Ok(())) => Shutdown::Completed,
            Ok(Err(e)) => Shutdown::Failed(e),
            Err(_) => Shutdown::Aborted,
        },
    }
}

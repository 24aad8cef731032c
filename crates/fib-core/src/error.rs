//! Error types for fib.

use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Input errors
    #[error("unexpected end of input")]
    EndOfInput,

    #[error("invalid input {input:?}: {source}")]
    InvalidInput {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    // Computation errors
    #[error("unsigned integer overflow")]
    Overflow { n: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error came from polling the input source.
    ///
    /// Input failures terminate the run loop; everything else is reported
    /// inline and the loop carries on.
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            Error::EndOfInput | Error::InvalidInput { .. } | Error::Io(_)
        )
    }
}

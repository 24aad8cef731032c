//! The Fibonacci function.

use crate::{Error, Result};

/// Largest index whose Fibonacci number fits in a `u64`.
pub const MAX_INDEX: u64 = 93;

/// Compute the `n`-th Fibonacci number, with `F(0) = 0` and `F(1) = 1`.
///
/// Returns [`Error::Overflow`] when the result does not fit in a `u64`.
pub fn fibonacci(n: u64) -> Result<u64> {
    if n <= 1 {
        return Ok(n);
    }

    let (mut prev, mut curr) = (0u64, 1u64);
    for _ in 1..n {
        let next = prev.checked_add(curr).ok_or(Error::Overflow { n })?;
        prev = curr;
        curr = next;
    }

    Ok(curr)
}

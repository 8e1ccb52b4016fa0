use std::io;

use thiserror::Error;

/// Unified error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum NlError {
    /// A send, receive, bind, connect, or option call failed at the
    /// transport level.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// The kernel returned an error message with a nonzero code. The code
    /// is already negated to a positive errno-style number (an `nlmsgerr`
    /// of `-12` becomes `Protocol(12)`).
    #[error("kernel reported error code {0}")]
    Protocol(i32),

    /// An outstanding operation was cancelled via `stop()`/`cancel()`.
    #[error("operation aborted")]
    Aborted,

    /// A neighbor get exhausted its reply stream without a match.
    #[error("no such neighbor entry")]
    NotFound,
}

impl NlError {
    /// Build a [`NlError::Protocol`] from a raw kernel `nlmsgerr.error`
    /// field, which is the negative of the conventional errno. `0` means
    /// success and is not representable as a `NlError`; callers must check
    /// for it before calling this.
    pub fn from_kernel_code(raw: i32) -> NlError {
        NlError::Protocol(raw.unsigned_abs() as i32)
    }
}

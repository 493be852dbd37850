//! Crate-wide error kinds.
//!
//! Mirrors the error taxonomy of the obfuscator's C ancestor: most kinds are
//! per-output and non-fatal (captured into a worker's result slot, never
//! unwound across the pool boundary); only [`ObfError::AllocFailure`] is
//! fatal and propagates to the caller of `new`/`obfuscate`.

use thiserror::Error;

/// Errors produced by index-set/level construction, encoding generation, and
/// circuit evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObfError {
    /// Allocation of the encoding family failed. Fatal; aborts the caller.
    #[error("allocation failure: {0}")]
    AllocFailure(String),

    /// The mmap backend failed to produce secret/public parameters.
    #[error("mmap keygen failure: {0}")]
    BackendKeygenFailure(String),

    /// Input shape or configuration was invalid (wrong `ninputs`/`noutputs`,
    /// a non-one-hot sigma-mode symbol, `ninputs % symlen != 0`, ...).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A ring operation (`add`/`sub`/`mul`) on the mmap backend failed while
    /// evaluating a specific output.
    #[error("ring operation failed for output {output}: {reason}")]
    RingOpFailure { output: usize, reason: String },

    /// The backend's zero test itself errored (as opposed to returning a
    /// definite true/false) for a specific output.
    #[error("zero test failed for output {output}")]
    ZeroTestFailure { output: usize },

    /// LZ only: an output's accumulated index set did not match the
    /// expected toplevel before zero-testing.
    #[error("index set mismatch at toplevel for output {output}")]
    TopLevelMismatch { output: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ObfError>;

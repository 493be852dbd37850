//! Replaces the original's verbose-flag global with an explicit sink passed
//! by the caller, per spec.md §9 ("Global state to eliminate").

use crate::error::ObfError;

/// Receives diagnostics emitted during generation/evaluation. Every
/// non-fatal [`ObfError`] (`RingOpFailure`, `ZeroTestFailure`,
/// `TopLevelMismatch`) is reported here before the corresponding output bit
/// is forced to `1`.
pub trait TelemetrySink: Send + Sync {
    /// Called once per non-fatal diagnostic.
    fn diagnostic(&self, err: &ObfError);
}

/// Default sink: routes every diagnostic through the `log` facade at
/// `warn!` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn diagnostic(&self, err: &ObfError) {
        log::warn!("{err}");
    }
}

/// Discards every diagnostic. Useful for property tests that intentionally
/// trigger a handful of expected failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn diagnostic(&self, _err: &ObfError) {}
}

//! Error types shared across the crate.

use thiserror::Error;

/// Errors surfaced by the solver library.
///
/// Singular Jacobians and hitting the iteration cap are *not* errors: the
/// Newton driver reports them through the solver trace and still returns the
/// best point found.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Unknown game name or otherwise unusable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The residual produced a vector of a different length than its input.
    /// The Newton solver requires a square system.
    #[error("dimension mismatch: input dim {input}, output dim {output}")]
    DimensionMismatch { input: usize, output: usize },

    /// Telemetry sink I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

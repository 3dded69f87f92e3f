// ============================================================================
// error.rs — Biosfera
// Error types for configuration validation, offline fitting, and export.
// Per-tick simulation logic never fails; it reports "no candidate" as None.
// ============================================================================

/// Alias for `Result<T, BiosferaError>`.
pub type BiosferaResult<T> = Result<T, BiosferaError>;

#[derive(Debug, thiserror::Error)]
pub enum BiosferaError {
    /// A configured range is empty or inverted, or a rate/dimension is
    /// non-positive.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The fitter was handed a series it cannot normalize or integrate
    /// (all-zero maximum, mismatched lengths, too few samples, no recorded
    /// deaths for the characteristic time).
    #[error("degenerate fit input: {0}")]
    DegenerateInput(String),

    /// The bounded optimizer exhausted its budget without improving on the
    /// initial guess.
    #[error("optimization diverged: no improvement after {sweeps} sweeps (loss {loss:.6})")]
    OptimizationDiverged { sweeps: usize, loss: f64 },

    /// Filesystem failure while exporting run data.
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

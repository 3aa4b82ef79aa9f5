//! Error types for the blockqueue simulation engine.
//!
//! Every variant here corresponds to a fatal, fail-fast condition: either a
//! malformed parameter set rejected at load time, or a degenerate generator
//! discovered while driving a scheduler. None of these are retried — a
//! retry after a `ZeroRate`/`DegenerateGenerator` would bias the simulated
//! distribution, so callers must treat any `SimError` as terminal.

use thiserror::Error;

/// Result type alias for blockqueue operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while loading parameters or driving a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A probability vector does not sum to 1 within tolerance.
    #[error("probability vector does not sum to 1 within tolerance (got {sum}, expected 1.0 +/- {tolerance})")]
    InvalidDistribution {
        /// The actual sum observed.
        sum: f64,
        /// The tolerance that was applied.
        tolerance: f64,
    },

    /// Matrix/vector sizes are inconsistent (e.g. C and D of different shape).
    #[error("dimension mismatch for {context}: {a} vs {b}")]
    DimensionMismatch {
        /// What was being compared (e.g. "C and D", "S and beta").
        context: String,
        /// First observed dimension.
        a: usize,
        /// Second observed dimension.
        b: usize,
    },

    /// All weights in the scheduler's competing-risk vector clamped to zero.
    #[error("degenerate generator: all transition weights are zero")]
    DegenerateGenerator,

    /// The combined diagonal rate at the current (MAP, PH) state is zero.
    #[error("zero combined rate at current state; cannot draw a holding time")]
    ZeroRate,

    /// A parameter CSV could not be interpreted as the required type.
    #[error("could not parse parameter '{name}': {reason}")]
    ParameterParseError {
        /// The parameter name (CSV file stem).
        name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The parameter directory is missing one or more required parameters.
    #[error("missing required parameter(s): {0:?}")]
    MissingParameter(Vec<String>),

    /// The parameter directory contains parameters outside the recognized set.
    #[error("extraneous parameter(s) not recognized: {0:?}")]
    ExtraneousParameter(Vec<String>),

    /// `b` (max transactions per block) must be a strictly positive integer.
    #[error("b must be a strictly positive integer, got {0}")]
    InvalidBlockCapacity(i64),

    /// A rate parameter (lambda, mu1, mu2) must be strictly positive.
    #[error("{name} must be strictly positive, got {value}")]
    InvalidRate {
        /// Parameter name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// `0 < sigma < tau` or `upsilon > 0` was violated.
    #[error("invalid recording window: {0}")]
    InvalidWindow(String),

    /// The truncated-normal fee distribution's bounds or scale are degenerate.
    #[error("invalid fee distribution: {0}")]
    InvalidFeeDistribution(String),

    /// Failure to access the parameter directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the evaluation crate.
//!
//! These are configuration problems detected before the first trial runs.
//! A trial that cannot be predicted is not an error; it is recorded and
//! only lowers coverage.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Leave-one-out needs at least one rating to hold out
    #[error("Cannot evaluate against an empty rating store")]
    EmptyStore,

    /// Neighborhood sizes must be positive
    #[error("Invalid neighborhood size {0}: must be at least 1")]
    InvalidNeighborhood(usize),

    /// A neighborhood sweep must be a non-empty, strictly ascending list
    #[error("Invalid neighborhood sweep: {0}")]
    InvalidSweep(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EvaluationError>;

//! Error types for the data-loader crate.
//!
//! Everything here is a structural problem with the input data. These errors
//! surface while the Rating Store is being built, before any evaluation runs.

use crate::types::{MovieId, UserId};
use thiserror::Error;

/// Errors that can occur while loading ratings and building the store
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same (user, movie) pair was rated more than once.
    ///
    /// Downstream code relies on at most one rating per pair, so this is
    /// rejected regardless of whether the two scores agree.
    #[error("Duplicate rating for user {user_id} and movie {movie_id}")]
    DuplicateRating { user_id: UserId, movie_id: MovieId },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

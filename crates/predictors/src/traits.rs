//! Core traits for rating predictors.
//!
//! Every predictor answers the same question: given a view of the ratings,
//! what would `user` rate `movie`? The evaluator only talks to this trait,
//! so adding a predictor never touches the evaluation harness.

use crate::view::RatingView;
use data_loader::{MovieId, UserId};
use serde::Serialize;
use std::fmt;

/// Why a predictor could not produce a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Unpredictable {
    /// The view holds no ratings at all
    EmptyStore,
    /// None of the selected neighbors rated the movie
    NoNeighbors,
    /// The qualifying neighbors' similarities sum to zero
    ZeroWeight,
    /// The target user has no other rating to take a mean from
    NoUserMean,
}

impl fmt::Display for Unpredictable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Unpredictable::EmptyStore => "no ratings available",
            Unpredictable::NoNeighbors => "no qualifying neighbors",
            Unpredictable::ZeroWeight => "neighbor weights sum to zero",
            Unpredictable::NoUserMean => "user has no other ratings",
        };
        f.write_str(reason)
    }
}

/// Outcome of a single prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    Score { value: f64, neighbors: usize },
    Unpredictable(Unpredictable),
}

impl Prediction {
    /// The predicted score, `None` when unpredictable
    pub fn score(&self) -> Option<f64> {
        match self {
            Prediction::Score { value, .. } => Some(*value),
            Prediction::Unpredictable(_) => None,
        }
    }

    /// Number of neighbors that contributed to the score
    pub fn neighbors(&self) -> usize {
        match self {
            Prediction::Score { neighbors, .. } => *neighbors,
            Prediction::Unpredictable(_) => 0,
        }
    }

    pub fn is_predictable(&self) -> bool {
        matches!(self, Prediction::Score { .. })
    }
}

/// Core trait for rating predictors.
///
/// ## Design Note
/// - `Send + Sync` lets one predictor serve every evaluation thread
/// - `predict` takes the view by reference and never mutates anything
pub trait Predictor: Send + Sync {
    /// Returns the name of this predictor (for logging and output files)
    fn name(&self) -> &str;

    /// Whether `predict` ranks neighbors.
    ///
    /// The evaluator uses this to decide if memoizing each user's
    /// neighborhood is worth it.
    fn uses_neighborhood(&self) -> bool {
        false
    }

    /// Predict the rating `user_id` would give `movie_id`.
    ///
    /// # Arguments
    /// * `view` - The ratings visible to the predictor
    /// * `user_id` - Target user
    /// * `movie_id` - Target movie
    /// * `max_neighbors` - Neighborhood size bound (ignored by non-neighbor predictors)
    fn predict(
        &self,
        view: &RatingView<'_>,
        user_id: UserId,
        movie_id: MovieId,
        max_neighbors: usize,
    ) -> Prediction;
}

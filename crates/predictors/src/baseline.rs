//! Baseline predictor - no neighbors involved.
//!
//! Falls back through increasingly general means:
//! 1. the target user's mean rating (other ratings only)
//! 2. the target movie's mean rating
//! 3. the global mean rating

use crate::traits::{Prediction, Predictor, Unpredictable};
use crate::view::RatingView;
use data_loader::{MovieId, UserId};

#[derive(Debug, Clone, Copy, Default)]
pub struct BaselinePredictor;

impl Predictor for BaselinePredictor {
    fn name(&self) -> &str {
        "baseline"
    }

    fn predict(
        &self,
        view: &RatingView<'_>,
        user_id: UserId,
        movie_id: MovieId,
        _max_neighbors: usize,
    ) -> Prediction {
        let value = view
            .user_mean(user_id)
            .or_else(|| view.movie_mean(movie_id))
            .or_else(|| view.global_mean());

        match value {
            Some(value) => Prediction::Score {
                value,
                neighbors: 0,
            },
            None => Prediction::Unpredictable(Unpredictable::EmptyStore),
        }
    }
}

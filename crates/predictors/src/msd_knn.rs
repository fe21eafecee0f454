//! MSD k-NN predictor.
//!
//! "Users who rate like you rated this movie ..."
//!
//! ## Algorithm
//! 1. Rank every other user by MSD similarity to the target user
//! 2. Keep the top `max_neighbors`
//! 3. Of those, take the ones that rated the target movie
//! 4. Predict the similarity-weighted average of their ratings:
//!    `sum(sim_i * r_i) / sum(sim_i)`

use crate::neighbors::{qualifying_neighbors, weighted_average};
use crate::similarity::{Msd, RatingScale};
use crate::traits::{Prediction, Predictor};
use crate::view::RatingView;
use data_loader::{MovieId, UserId};

#[derive(Debug, Clone, Copy, Default)]
pub struct MsdKnnPredictor {
    metric: Msd,
}

impl MsdKnnPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the rating scale used to normalize similarities (default: 0.5..5.0)
    pub fn with_scale(mut self, scale: RatingScale) -> Self {
        self.metric = Msd::new(scale);
        self
    }

    pub fn metric(&self) -> &Msd {
        &self.metric
    }
}

impl Predictor for MsdKnnPredictor {
    fn name(&self) -> &str {
        "msd"
    }

    fn uses_neighborhood(&self) -> bool {
        true
    }

    fn predict(
        &self,
        view: &RatingView<'_>,
        user_id: UserId,
        movie_id: MovieId,
        max_neighbors: usize,
    ) -> Prediction {
        let neighbors = qualifying_neighbors(view, &self.metric, user_id, movie_id, max_neighbors);
        let terms = neighbors
            .iter()
            .map(|n| (n.neighbor.similarity, n.rating));

        match weighted_average(terms) {
            Ok(value) => Prediction::Score {
                value,
                neighbors: neighbors.len(),
            },
            Err(reason) => Prediction::Unpredictable(reason),
        }
    }
}

//! Resnick (mean-centered) k-NN predictor.
//!
//! Same neighbors as the MSD predictor, but each neighbor contributes how
//! far their rating sits from their own mean, and the weighted deviation is
//! added to the target user's mean:
//!
//! ```text
//! mean_u + sum(sim_i * (r_i - mean_i)) / sum(sim_i)
//! ```
//!
//! A target user with no other rating has no mean and is unpredictable.
//! Substituting the baseline here would blur the two predictors in an
//! evaluation.

use crate::neighbors::{qualifying_neighbors, weighted_average};
use crate::similarity::{Msd, RatingScale};
use crate::traits::{Prediction, Predictor, Unpredictable};
use crate::view::RatingView;
use data_loader::{MovieId, UserId};

#[derive(Debug, Clone, Copy, Default)]
pub struct ResnickKnnPredictor {
    metric: Msd,
}

impl ResnickKnnPredictor {
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

impl Predictor for ResnickKnnPredictor {
    fn name(&self) -> &str {
        "resnick"
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
        let Some(user_mean) = view.user_mean(user_id) else {
            return Prediction::Unpredictable(Unpredictable::NoUserMean);
        };

        let neighbors = qualifying_neighbors(view, &self.metric, user_id, movie_id, max_neighbors);
        let terms = neighbors.iter().filter_map(|n| {
            let neighbor_mean = view.user_mean(n.neighbor.user_id)?;
            Some((n.neighbor.similarity, n.rating - neighbor_mean))
        });

        match weighted_average(terms) {
            Ok(offset) => Prediction::Score {
                value: user_mean + offset,
                neighbors: neighbors.len(),
            },
            Err(reason) => Prediction::Unpredictable(reason),
        }
    }
}

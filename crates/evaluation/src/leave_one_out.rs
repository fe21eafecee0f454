//! Leave-one-out evaluation.
//!
//! Each rating in the store is hidden in turn, the predictor is asked for
//! it against the remaining ratings, and the prediction is compared with
//! the hidden value.
//!
//! ## Algorithm
//! 1. Group trials by user and run the groups in parallel
//! 2. For a neighborhood predictor, compute the user's co-rating
//!    statistics once on the full store
//! 3. For each of the user's ratings, build a view hiding that rating and
//!    let the memo recompute only the pairs that co-rated the hidden movie
//! 4. Concatenate the groups in user order so output never depends on
//!    scheduling

use crate::error::{EvaluationError, Result};
use crate::record::{EvaluationRecord, EvaluationResult};
use data_loader::{RatingStore, UserId};
use predictors::{Neighborhood, Predictor, RatingView};
use rayon::prelude::*;
use std::time::Instant;
use tracing::instrument;

/// Leave-one-out evaluator over a borrowed rating store.
///
/// The store is never modified; every trial sees a logical view with one
/// rating hidden.
#[derive(Debug, Clone, Copy)]
pub struct LeaveOneOut<'a> {
    store: &'a RatingStore,
    memoize: bool,
}

impl<'a> LeaveOneOut<'a> {
    /// Create an evaluator for `store`.
    ///
    /// # Returns
    /// * `Err(EvaluationError::EmptyStore)` - There is nothing to hold out
    pub fn new(store: &'a RatingStore) -> Result<Self> {
        if store.is_empty() {
            return Err(EvaluationError::EmptyStore);
        }
        Ok(Self {
            store,
            memoize: true,
        })
    }

    /// Toggle per-user neighborhood memoization (default: on).
    ///
    /// Results are identical either way; turning it off recomputes every
    /// similarity from scratch in every trial.
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn store(&self) -> &'a RatingStore {
        self.store
    }

    /// Run one trial per rating.
    ///
    /// # Arguments
    /// * `predictor` - Any predictor; it only ever sees the view
    /// * `max_neighbors` - Neighborhood size bound passed to every trial
    ///
    /// # Returns
    /// * `Ok(EvaluationResult)` - Records in (user, movie) order, with RMSE,
    ///   coverage and the wall-clock time of all trials
    /// * `Err(EvaluationError::InvalidNeighborhood)` - `max_neighbors` is 0
    #[instrument(skip(self, predictor), fields(predictor = predictor.name()))]
    pub fn evaluate(
        &self,
        predictor: &dyn Predictor,
        max_neighbors: usize,
    ) -> Result<EvaluationResult> {
        if max_neighbors == 0 {
            return Err(EvaluationError::InvalidNeighborhood(max_neighbors));
        }

        let memoize = self.memoize && predictor.uses_neighborhood();
        tracing::debug!(
            "Starting {} trials (memoized neighborhoods: {})",
            self.store.len(),
            memoize
        );

        let start = Instant::now();
        let groups: Vec<Vec<EvaluationRecord>> = self
            .store
            .user_ids()
            .par_iter()
            .map(|&user_id| self.evaluate_user(predictor, user_id, max_neighbors, memoize))
            .collect();
        let elapsed = start.elapsed();

        let records: Vec<EvaluationRecord> = groups.into_iter().flatten().collect();
        let result = EvaluationResult::new(predictor.name(), max_neighbors, records, elapsed);

        tracing::info!(
            "{} (N={}): rmse={} coverage={:.4} in {:.2?}",
            result.predictor(),
            max_neighbors,
            result
                .rmse()
                .map_or_else(|| "NA".to_string(), |rmse| format!("{:.4}", rmse)),
            result.coverage(),
            elapsed
        );
        Ok(result)
    }

    /// All trials for one user, in movie order
    fn evaluate_user(
        &self,
        predictor: &dyn Predictor,
        user_id: UserId,
        max_neighbors: usize,
        memoize: bool,
    ) -> Vec<EvaluationRecord> {
        let neighborhood = memoize.then(|| Neighborhood::of(self.store, user_id));

        self.store
            .user_ratings(user_id)
            .iter()
            .filter_map(|&rating| {
                // always Some: the rating comes from the store itself
                let mut view = RatingView::without(self.store, rating)?;
                if let Some(neighborhood) = &neighborhood {
                    view = view.with_neighborhood(neighborhood);
                }
                let prediction =
                    predictor.predict(&view, rating.user_id, rating.movie_id, max_neighbors);
                Some(EvaluationRecord::new(rating, prediction))
            })
            .collect()
    }
}

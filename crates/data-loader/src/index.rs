//! RatingStore building and indexing logic.
//!
//! Turns a flat list of ratings into the indexed, immutable store:
//! - validate every fact (finite score, unique (user, movie) pair)
//! - build per-user and per-movie rating lists in a stable order
//! - compute per-user, per-movie and global aggregates

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

impl RatingStore {
    /// Load a ratings file and build the store from it.
    ///
    /// Any malformed line or duplicate pair aborts loading.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading ratings from {:?}", path);

        let ratings = parser::parse_ratings(path)?;
        debug!("Parsed {} rating lines", ratings.len());

        let store = Self::from_ratings(ratings)?;
        let (users, movies, ratings) = store.counts();
        info!(
            "Loaded {} users, {} movies, {} ratings",
            users, movies, ratings
        );
        Ok(store)
    }

    /// Build a store from rating facts.
    ///
    /// Fails with `InvalidValue` for a non-finite score and with
    /// `DuplicateRating` when a (user, movie) pair occurs more than once.
    pub fn from_ratings(ratings: Vec<Rating>) -> Result<Self> {
        if let Some(bad) = ratings.iter().find(|r| !r.rating.is_finite()) {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: bad.rating.to_string(),
            });
        }

        let mut store = RatingStore::new();

        for rating in ratings {
            store
                .user_ratings
                .entry(rating.user_id)
                .or_insert_with(Vec::new)
                .push(rating);
            store
                .movie_ratings
                .entry(rating.movie_id)
                .or_insert_with(Vec::new)
                .push(rating);
        }

        store.sort_indices();
        store.validate()?;
        store.compute_summaries();

        Ok(store)
    }

    /// Put every index into its stable order
    fn sort_indices(&mut self) {
        self.user_ratings
            .par_iter_mut()
            .for_each(|(_, ratings)| ratings.sort_by_key(|r| r.movie_id));
        self.movie_ratings
            .par_iter_mut()
            .for_each(|(_, ratings)| ratings.sort_by_key(|r| r.user_id));

        self.user_ids = self.user_ratings.keys().copied().collect();
        self.user_ids.sort_unstable();
        self.movie_ids = self.movie_ratings.keys().copied().collect();
        self.movie_ids.sort_unstable();
    }

    /// Reject duplicate (user, movie) pairs.
    ///
    /// Runs after `sort_indices`, so duplicates are adjacent. Users are
    /// scanned in ascending order so the reported pair is deterministic.
    fn validate(&self) -> Result<()> {
        for &user_id in &self.user_ids {
            let ratings = self.user_ratings(user_id);
            if let Some(pair) = ratings.windows(2).find(|w| w[0].movie_id == w[1].movie_id) {
                return Err(DataLoadError::DuplicateRating {
                    user_id,
                    movie_id: pair[0].movie_id,
                });
            }
        }
        Ok(())
    }

    /// Compute aggregate statistics for all users and movies in parallel
    fn compute_summaries(&mut self) {
        self.user_summaries = self
            .user_ratings
            .par_iter()
            .map(|(&user_id, ratings)| {
                (
                    user_id,
                    RatingSummary::from_values(ratings.iter().map(|r| r.rating)),
                )
            })
            .collect::<HashMap<_, _>>();

        self.movie_summaries = self
            .movie_ratings
            .par_iter()
            .map(|(&movie_id, ratings)| {
                (
                    movie_id,
                    RatingSummary::from_values(ratings.iter().map(|r| r.rating)),
                )
            })
            .collect::<HashMap<_, _>>();

        // Sequential, in (user, movie) order, so the global sum is reproducible
        self.global_summary = RatingSummary::from_values(self.ratings().map(|r| r.rating));
    }
}

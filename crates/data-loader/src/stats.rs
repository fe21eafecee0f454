//! Descriptive statistics over a RatingStore.
//!
//! Dataset-level numbers (counts, density, mean, rating histogram) and
//! per-user / per-movie rows suitable for tabular output.

use crate::types::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Dataset-level statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub user_count: usize,
    pub movie_count: usize,
    pub rating_count: usize,
    /// ratings / (users * movies)
    pub density: f64,
    pub mean_rating: Option<f64>,
    /// Number of ratings per score, keyed by the score in tenths
    /// (so 3.5 is stored under 35)
    pub histogram: BTreeMap<i64, usize>,
}

impl DatasetStats {
    pub fn compute(store: &RatingStore) -> Self {
        let (user_count, movie_count, rating_count) = store.counts();

        let cells = user_count as f64 * movie_count as f64;
        let density = if cells > 0.0 {
            rating_count as f64 / cells
        } else {
            0.0
        };

        let mut histogram = BTreeMap::new();
        for rating in store.ratings() {
            *histogram.entry(tenths(rating.rating)).or_insert(0) += 1;
        }

        Self {
            user_count,
            movie_count,
            rating_count,
            density,
            mean_rating: store.global_summary().mean(),
            histogram,
        }
    }

    /// Histogram entries as (score, count), ascending by score
    pub fn histogram_scores(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.histogram
            .iter()
            .map(|(&key, &count)| (key as f64 / 10.0, count))
    }
}

fn tenths(score: f64) -> i64 {
    (score * 10.0).round() as i64
}

/// Statistics for a single user or movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityStats {
    pub id: u32,
    pub rating_count: u32,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl EntityStats {
    fn from_summary(id: u32, summary: &RatingSummary) -> Option<Self> {
        Some(Self {
            id,
            rating_count: summary.count,
            mean: summary.mean()?,
            std_dev: summary.std_dev()?,
            min: summary.min,
            max: summary.max,
        })
    }
}

/// One row per user, ascending by user id
pub fn per_user_stats(store: &RatingStore) -> Vec<EntityStats> {
    collect_stats(store.user_ids(), &store.user_summaries)
}

/// One row per movie, ascending by movie id
pub fn per_movie_stats(store: &RatingStore) -> Vec<EntityStats> {
    collect_stats(store.movie_ids(), &store.movie_summaries)
}

fn collect_stats(ids: &[u32], summaries: &HashMap<u32, RatingSummary>) -> Vec<EntityStats> {
    ids.par_iter()
        .filter_map(|&id| EntityStats::from_summary(id, summaries.get(&id)?))
        .collect()
}

//! Core domain types for ratings datasets.
//!
//! This module defines the fundamental data structures used throughout the
//! workspace: identifiers, the `Rating` fact, running aggregates over rating
//! values, and the immutable `RatingStore` that owns every fact.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating given by a user to a movie.
///
/// The score is an opaque ordered real. Nothing in the core assumes a
/// particular scale; the only scale-aware code is the similarity
/// normalization, which takes its range as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Running aggregate over a set of rating values.
///
/// Kept per user, per movie and for the whole store. `without` removes a
/// single observation in O(1), which is what makes leave-one-out means cheap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: u32,
    pub sum: f64,
    pub sum_squares: f64,
    pub min: f64,
    pub max: f64,
}

impl RatingSummary {
    /// An aggregate over no values
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_squares: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut summary = Self::empty();
        for value in values {
            summary.push(value);
        }
        summary
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_squares += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// The same aggregate with one observation of `value` removed.
    ///
    /// `min` and `max` are carried over unchanged: they cannot be updated
    /// in O(1) and are only read for descriptive statistics.
    pub fn without(&self, value: f64) -> Self {
        debug_assert!(self.count > 0, "removing a value from an empty summary");
        Self {
            count: self.count.saturating_sub(1),
            sum: self.sum - value,
            sum_squares: self.sum_squares - value * value,
            min: self.min,
            max: self.max,
        }
    }

    /// Arithmetic mean, or `None` when there are no values
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Population standard deviation, or `None` when there are no values
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self.sum_squares / self.count as f64 - mean * mean;
        // Cancellation can push a zero variance slightly negative
        Some(variance.max(0.0).sqrt())
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// RatingStore - The Immutable In-Memory Dataset
// =============================================================================

/// Owns every rating and the per-user / per-movie indexes derived from them.
///
/// The store is built once (see `RatingStore::from_ratings`) and never
/// mutated afterwards, so it can be shared by reference across threads.
///
/// Invariants established at construction:
/// - at most one rating per (user, movie) pair
/// - each user's ratings are sorted by movie id
/// - each movie's ratings are sorted by user id
/// - `user_ids` and `movie_ids` are sorted ascending
#[derive(Debug)]
pub struct RatingStore {
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    // Precomputed aggregates
    pub(crate) user_summaries: HashMap<UserId, RatingSummary>,
    pub(crate) movie_summaries: HashMap<MovieId, RatingSummary>,
    pub(crate) global_summary: RatingSummary,

    // Stable iteration order
    pub(crate) user_ids: Vec<UserId>,
    pub(crate) movie_ids: Vec<MovieId>,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self {
            user_ratings: HashMap::new(),
            movie_ratings: HashMap::new(),
            user_summaries: HashMap::new(),
            movie_summaries: HashMap::new(),
            global_summary: RatingSummary::empty(),
            user_ids: Vec::new(),
            movie_ids: Vec::new(),
        }
    }

    /// All ratings made by a user, sorted by movie id.
    ///
    /// Returns an empty slice for an unknown user.
    pub fn user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All ratings received by a movie, sorted by user id
    pub fn movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The score `user_id` gave `movie_id`, if any
    pub fn rating(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        let ratings = self.user_ratings(user_id);
        ratings
            .binary_search_by_key(&movie_id, |r| r.movie_id)
            .ok()
            .map(|idx| ratings[idx].rating)
    }

    pub fn user_summary(&self, user_id: UserId) -> Option<&RatingSummary> {
        self.user_summaries.get(&user_id)
    }

    pub fn movie_summary(&self, movie_id: MovieId) -> Option<&RatingSummary> {
        self.movie_summaries.get(&movie_id)
    }

    /// Aggregate over every rating in the store
    pub fn global_summary(&self) -> &RatingSummary {
        &self.global_summary
    }

    /// Every user with at least one rating, ascending
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// Every movie with at least one rating, ascending
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// Every rating, ordered by user id then movie id
    pub fn ratings(&self) -> impl Iterator<Item = &Rating> + '_ {
        self.user_ids
            .iter()
            .flat_map(move |&user_id| self.user_ratings(user_id).iter())
    }

    /// Number of ratings in the store
    pub fn len(&self) -> usize {
        self.global_summary.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get (users, movies, ratings) counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_ids.len(), self.movie_ids.len(), self.len())
    }
}

impl Default for RatingStore {
    fn default() -> Self {
        Self::new()
    }
}

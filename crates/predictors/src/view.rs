//! Leave-one-out view over a RatingStore.
//!
//! A `RatingView` is the store as a predictor sees it during one trial:
//! identical to the full store except that at most one rating is hidden.
//! Nothing is copied. Iterators skip the hidden rating and means are derived
//! from the store's aggregates with the hidden score subtracted in O(1).

use crate::similarity::Neighborhood;
use data_loader::{MovieId, Rating, RatingStore, RatingSummary, UserId};

#[derive(Debug, Clone, Copy)]
pub struct RatingView<'a> {
    store: &'a RatingStore,
    held_out: Option<Rating>,
    neighborhood: Option<&'a Neighborhood>,
}

impl<'a> RatingView<'a> {
    /// The whole store, nothing hidden
    pub fn full(store: &'a RatingStore) -> Self {
        Self {
            store,
            held_out: None,
            neighborhood: None,
        }
    }

    /// The store with `rating` hidden.
    ///
    /// Returns `None` unless the store holds exactly this rating, score
    /// included; the O(1) summaries subtract it from the store's aggregates.
    pub fn without(store: &'a RatingStore, rating: Rating) -> Option<Self> {
        if store.rating(rating.user_id, rating.movie_id) != Some(rating.rating) {
            return None;
        }
        Some(Self {
            store,
            held_out: Some(rating),
            neighborhood: None,
        })
    }

    /// Attach a memoized neighborhood of one anchor user.
    ///
    /// The neighborhood must have been computed on the full store; the view
    /// adjusts it for the hidden rating when it is read.
    pub fn with_neighborhood(mut self, neighborhood: &'a Neighborhood) -> Self {
        self.neighborhood = Some(neighborhood);
        self
    }

    pub fn store(&self) -> &'a RatingStore {
        self.store
    }

    pub fn held_out(&self) -> Option<Rating> {
        self.held_out
    }

    pub fn neighborhood(&self) -> Option<&'a Neighborhood> {
        self.neighborhood
    }

    /// Ratings made by `user_id`, sorted by movie id
    pub fn user_ratings(&self, user_id: UserId) -> impl Iterator<Item = &'a Rating> {
        let held_out = self.held_out;
        self.store
            .user_ratings(user_id)
            .iter()
            .filter(move |r| !hides(held_out, r))
    }

    /// Ratings received by `movie_id`, sorted by user id
    pub fn movie_ratings(&self, movie_id: MovieId) -> impl Iterator<Item = &'a Rating> {
        let held_out = self.held_out;
        self.store
            .movie_ratings(movie_id)
            .iter()
            .filter(move |r| !hides(held_out, r))
    }

    pub fn rating(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        if self
            .held_out
            .is_some_and(|r| r.user_id == user_id && r.movie_id == movie_id)
        {
            return None;
        }
        self.store.rating(user_id, movie_id)
    }

    /// Number of ratings visible in the view
    pub fn len(&self) -> usize {
        self.global_summary().count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn user_summary(&self, user_id: UserId) -> RatingSummary {
        let summary = self
            .store
            .user_summary(user_id)
            .copied()
            .unwrap_or_default();
        match self.held_out {
            Some(r) if r.user_id == user_id => summary.without(r.rating),
            _ => summary,
        }
    }

    pub fn movie_summary(&self, movie_id: MovieId) -> RatingSummary {
        let summary = self
            .store
            .movie_summary(movie_id)
            .copied()
            .unwrap_or_default();
        match self.held_out {
            Some(r) if r.movie_id == movie_id => summary.without(r.rating),
            _ => summary,
        }
    }

    pub fn global_summary(&self) -> RatingSummary {
        let summary = *self.store.global_summary();
        match self.held_out {
            Some(r) => summary.without(r.rating),
            None => summary,
        }
    }

    /// Mean of the user's visible ratings, `None` if there are none
    pub fn user_mean(&self, user_id: UserId) -> Option<f64> {
        self.user_summary(user_id).mean()
    }

    pub fn movie_mean(&self, movie_id: MovieId) -> Option<f64> {
        self.movie_summary(movie_id).mean()
    }

    pub fn global_mean(&self) -> Option<f64> {
        self.global_summary().mean()
    }
}

fn hides(held_out: Option<Rating>, rating: &Rating) -> bool {
    held_out.is_some_and(|r| r.user_id == rating.user_id && r.movie_id == rating.movie_id)
}

//! Mean-Squared-Difference user similarity.
//!
//! Two users are compared over the movies both of them rated (the co-rated
//! set). The pair is summarized by `CoRated`, the count of co-rated movies
//! and the sum of squared rating differences, and the similarity is
//!
//! ```text
//! 1 - (sum_squared_diff / count) / range^2
//! ```
//!
//! where `range` comes from the configured `RatingScale`. An empty co-rated
//! set has no similarity at all (`None`), which is different from a
//! similarity of zero.
//!
//! `Neighborhood` memoizes the `CoRated` statistics of one anchor user
//! against everybody else on the full store. A leave-one-out view only hides
//! one rating, so only the pairs that co-rated the hidden movie differ from
//! the memo. Those are recomputed through the view; subtracting the squared
//! difference instead would leave rounding residue for scores that are not
//! exact in binary.

use crate::view::RatingView;
use data_loader::{RatingStore, UserId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Bounds of the rating scale, used to normalize squared differences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    min: f64,
    max: f64,
}

impl RatingScale {
    /// Returns `None` unless both bounds are finite and `max > min`
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite() && max > min).then_some(Self { min, max })
    }

    /// The scale spanned by the ratings actually present in the store
    pub fn observed(store: &RatingStore) -> Option<Self> {
        let summary = store.global_summary();
        Self::new(summary.min, summary.max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for RatingScale {
    /// Half-point scale from 0.5 to 5.0
    fn default() -> Self {
        Self { min: 0.5, max: 5.0 }
    }
}

/// Sufficient statistics of a user pair over their co-rated movies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoRated {
    pub count: u32,
    pub sum_squared_diff: f64,
}

impl CoRated {
    pub fn add(&mut self, a: f64, b: f64) {
        let diff = a - b;
        self.count += 1;
        self.sum_squared_diff += diff * diff;
    }

    pub fn mean_squared_diff(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_squared_diff / self.count as f64)
    }
}

/// Co-rated statistics of two users, computed from scratch in `view`
pub fn co_rated(view: &RatingView<'_>, a: UserId, b: UserId) -> CoRated {
    let mut stats = CoRated::default();
    let mut left = view.user_ratings(a).peekable();
    let mut right = view.user_ratings(b).peekable();

    // Both sides are sorted by movie id
    while let (Some(&&x), Some(&&y)) = (left.peek(), right.peek()) {
        match x.movie_id.cmp(&y.movie_id) {
            Ordering::Less => {
                left.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Equal => {
                stats.add(x.rating, y.rating);
                left.next();
                right.next();
            }
        }
    }
    stats
}

/// Co-rated statistics of `anchor` against every user sharing at least one
/// movie with it in `view`, computed from scratch.
pub fn co_rated_neighbors(view: &RatingView<'_>, anchor: UserId) -> HashMap<UserId, CoRated> {
    let mut neighbors: HashMap<UserId, CoRated> = HashMap::new();
    for mine in view.user_ratings(anchor) {
        for theirs in view.movie_ratings(mine.movie_id) {
            if theirs.user_id != anchor {
                neighbors
                    .entry(theirs.user_id)
                    .or_default()
                    .add(mine.rating, theirs.rating);
            }
        }
    }
    neighbors
}

/// The MSD similarity metric
#[derive(Debug, Clone, Copy, Default)]
pub struct Msd {
    scale: RatingScale,
}

impl Msd {
    pub fn new(scale: RatingScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    /// Similarity from pair statistics, `None` for an empty co-rated set.
    ///
    /// Clamped to `[0, 1]` so ratings outside the configured scale cannot
    /// produce negative weights.
    pub fn from_co_rated(&self, stats: &CoRated) -> Option<f64> {
        let msd = stats.mean_squared_diff()?;
        let range = self.scale.range();
        Some((1.0 - msd / (range * range)).clamp(0.0, 1.0))
    }

    /// Similarity of two users over their co-rated movies in `view`
    pub fn similarity(&self, view: &RatingView<'_>, a: UserId, b: UserId) -> Option<f64> {
        self.from_co_rated(&co_rated(view, a, b))
    }
}

/// Memoized co-rated statistics of one anchor user on the full store
#[derive(Debug, Clone)]
pub struct Neighborhood {
    anchor: UserId,
    co_rated: HashMap<UserId, CoRated>,
}

impl Neighborhood {
    pub fn of(store: &RatingStore, anchor: UserId) -> Self {
        let co_rated = co_rated_neighbors(&RatingView::full(store), anchor);
        tracing::trace!("User {} shares movies with {} users", anchor, co_rated.len());
        Self { anchor, co_rated }
    }

    pub fn anchor(&self) -> UserId {
        self.anchor
    }

    /// Number of users sharing at least one movie with the anchor
    pub fn len(&self) -> usize {
        self.co_rated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.co_rated.is_empty()
    }

    /// Statistics of the anchor against `other` as seen through `view`.
    ///
    /// `None` when the two users share no movie in the full store.
    pub fn co_rated_in(&self, view: &RatingView<'_>, other: UserId) -> Option<CoRated> {
        self.co_rated
            .get(&other)
            .map(|stats| self.adjust(view, other, *stats))
    }

    /// Every user sharing a movie with the anchor on the full store, with
    /// statistics adjusted for `view`. Entries may end up with a zero count.
    pub fn co_rated_all<'s>(
        &'s self,
        view: &'s RatingView<'_>,
    ) -> impl Iterator<Item = (UserId, CoRated)> + 's {
        self.co_rated
            .iter()
            .map(move |(&other, stats)| (other, self.adjust(view, other, *stats)))
    }

    fn adjust(&self, view: &RatingView<'_>, other: UserId, stats: CoRated) -> CoRated {
        let Some(hidden) = view.held_out() else {
            return stats;
        };
        let partner = if hidden.user_id == self.anchor {
            other
        } else if hidden.user_id == other {
            self.anchor
        } else {
            return stats;
        };
        if view.store().rating(partner, hidden.movie_id).is_some() {
            co_rated(view, self.anchor, other)
        } else {
            stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Rating;
    use proptest::prelude::*;

    const A: UserId = 1;
    const B: UserId = 2;
    const X: u32 = 100;
    const Y: u32 = 200;

    fn scenario_store() -> RatingStore {
        RatingStore::from_ratings(vec![
            Rating::new(A, X, 5.0),
            Rating::new(A, Y, 3.0),
            Rating::new(B, X, 4.0),
            Rating::new(B, Y, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_msd_scenario() {
        let store = scenario_store();
        let msd = Msd::default();
        let sim = msd.similarity(&RatingView::full(&store), A, B).unwrap();

        // mean squared diff 1.0, range 4.5
        let expected = 1.0 - 1.0 / (4.5 * 4.5);
        assert!((sim - expected).abs() < 1e-12);
        assert!((sim - 0.9506).abs() < 1e-4);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let store = scenario_store();
        let msd = Msd::default();
        let view = RatingView::full(&store);
        assert_eq!(msd.similarity(&view, A, B), msd.similarity(&view, B, A));
    }

    #[test]
    fn test_single_co_rated_movie_is_enough() {
        let store = scenario_store();
        let msd = Msd::default();
        let view = RatingView::without(&store, Rating::new(A, X, 5.0)).unwrap();

        let stats = co_rated(&view, A, B);
        assert_eq!(stats.count, 1);
        let sim = msd.similarity(&view, A, B).unwrap();
        assert!((sim - (1.0 - 1.0 / 20.25)).abs() < 1e-12);
    }

    #[test]
    fn test_no_co_rated_movies_is_undefined_not_zero() {
        let store = RatingStore::from_ratings(vec![
            Rating::new(A, X, 5.0),
            Rating::new(B, Y, 5.0),
        ])
        .unwrap();
        let msd = Msd::default();
        assert_eq!(msd.similarity(&RatingView::full(&store), A, B), None);
    }

    #[test]
    fn test_maximal_disagreement_is_zero() {
        let store = RatingStore::from_ratings(vec![
            Rating::new(A, X, 0.5),
            Rating::new(B, X, 5.0),
        ])
        .unwrap();
        let msd = Msd::default();
        assert_eq!(msd.similarity(&RatingView::full(&store), A, B), Some(0.0));
    }

    #[test]
    fn test_out_of_scale_ratings_are_clamped() {
        let store = RatingStore::from_ratings(vec![
            Rating::new(A, X, -10.0),
            Rating::new(B, X, 10.0),
        ])
        .unwrap();
        let msd = Msd::default();
        assert_eq!(msd.similarity(&RatingView::full(&store), A, B), Some(0.0));
    }

    #[test]
    fn test_rating_scale_validation() {
        assert!(RatingScale::new(1.0, 5.0).is_some());
        assert!(RatingScale::new(5.0, 5.0).is_none());
        assert!(RatingScale::new(5.0, 1.0).is_none());
        assert!(RatingScale::new(f64::NAN, 1.0).is_none());
        assert_eq!(RatingScale::default().range(), 4.5);
    }

    #[test]
    fn test_observed_scale() {
        let scale = RatingScale::observed(&scenario_store()).unwrap();
        assert_eq!(scale.min(), 2.0);
        assert_eq!(scale.max(), 5.0);
        assert!(RatingScale::observed(&RatingStore::new()).is_none());
    }

    #[test]
    fn test_neighborhood_excludes_anchor() {
        let store = scenario_store();
        let neighborhood = Neighborhood::of(&store, A);
        assert_eq!(neighborhood.anchor(), A);
        assert_eq!(neighborhood.len(), 1);
        assert!(neighborhood.co_rated_in(&RatingView::full(&store), A).is_none());
    }

    #[test]
    fn test_neighborhood_adjusts_for_held_out_rating() {
        let store = scenario_store();
        let neighborhood = Neighborhood::of(&store, A);

        let full = neighborhood
            .co_rated_in(&RatingView::full(&store), B)
            .unwrap();
        assert_eq!(full.count, 2);

        let view = RatingView::without(&store, Rating::new(A, X, 5.0)).unwrap();
        let held = neighborhood.co_rated_in(&view, B).unwrap();
        assert_eq!(held.count, 1);
        assert!((held.sum_squared_diff - 1.0).abs() < 1e-12);

        // the neighbor's rating hidden instead
        let view = RatingView::without(&store, Rating::new(B, Y, 2.0)).unwrap();
        let held = neighborhood.co_rated_in(&view, B).unwrap();
        assert_eq!(held.count, 1);
    }

    #[test]
    fn test_neighborhood_is_exact_for_tenth_step_scores() {
        let store = RatingStore::from_ratings(vec![
            Rating::new(A, X, 0.3),
            Rating::new(A, Y, 4.7),
            Rating::new(A, 300, 2.9),
            Rating::new(B, X, 0.1),
            Rating::new(B, Y, 3.3),
            Rating::new(B, 300, 1.7),
            Rating::new(3, X, 4.9),
            Rating::new(3, 300, 0.7),
        ])
        .unwrap();
        let msd = Msd::default();

        for anchor in [A, B, 3] {
            let neighborhood = Neighborhood::of(&store, anchor);
            for held_out in store.ratings() {
                let view = RatingView::without(&store, *held_out).unwrap();
                for &other in store.user_ids() {
                    if other == anchor {
                        continue;
                    }
                    let fresh = co_rated(&view, anchor, other);
                    let cached = neighborhood.co_rated_in(&view, other).unwrap();
                    assert_eq!(cached, fresh);
                    assert_eq!(msd.from_co_rated(&cached), msd.similarity(&view, anchor, other));
                }
            }
        }
    }

    fn arb_stepped_ratings(step: f64, steps: u32) -> impl Strategy<Value = Vec<Rating>> {
        prop::collection::btree_map((1u32..10, 1u32..12), 1u32..=steps, 1..50).prop_map(
            move |cells| {
                cells
                    .into_iter()
                    .map(|((user, movie), k)| Rating::new(user, movie, k as f64 * step))
                    .collect()
            },
        )
    }

    fn arb_ratings() -> impl Strategy<Value = Vec<Rating>> {
        arb_stepped_ratings(0.5, 10)
    }

    /// Scores like 0.1 or 2.3 that have no exact binary representation
    fn arb_tenth_step_ratings() -> impl Strategy<Value = Vec<Rating>> {
        arb_stepped_ratings(0.1, 50)
    }

    proptest! {
        #[test]
        fn prop_similarity_is_symmetric(ratings in arb_ratings()) {
            let store = RatingStore::from_ratings(ratings).unwrap();
            let view = RatingView::full(&store);
            let msd = Msd::default();

            for &a in store.user_ids() {
                for &b in store.user_ids() {
                    let ab = msd.similarity(&view, a, b);
                    prop_assert_eq!(ab, msd.similarity(&view, b, a));
                    if let Some(sim) = ab {
                        prop_assert!((0.0..=1.0).contains(&sim));
                    }
                }
            }
        }

        #[test]
        fn prop_memoized_neighborhood_matches_recomputation(
            ratings in prop_oneof![arb_ratings(), arb_tenth_step_ratings()]
        ) {
            let store = RatingStore::from_ratings(ratings).unwrap();

            for &anchor in store.user_ids() {
                let neighborhood = Neighborhood::of(&store, anchor);
                for held_out in store.ratings() {
                    let view = RatingView::without(&store, *held_out).unwrap();
                    let fresh = co_rated_neighbors(&view, anchor);

                    // bit-for-bit, not within a tolerance
                    for (other, cached) in neighborhood.co_rated_all(&view) {
                        let recomputed = fresh.get(&other).copied().unwrap_or_default();
                        prop_assert_eq!(cached, recomputed);
                    }
                    // nothing appears from scratch that the memo does not know about
                    for other in fresh.keys() {
                        prop_assert!(neighborhood.co_rated_in(&view, *other).is_some());
                    }
                }
            }
        }

        #[test]
        fn prop_user_without_other_ratings_has_no_similarity(ratings in arb_ratings()) {
            let store = RatingStore::from_ratings(ratings).unwrap();
            let msd = Msd::default();

            for held_out in store.ratings() {
                if store.user_ratings(held_out.user_id).len() != 1 {
                    continue;
                }
                let view = RatingView::without(&store, *held_out).unwrap();
                for &other in store.user_ids() {
                    prop_assert_eq!(msd.similarity(&view, held_out.user_id, other), None);
                }
            }
        }
    }
}

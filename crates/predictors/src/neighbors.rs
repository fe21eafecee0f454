//! Neighbor selection shared by the k-NN predictors.
//!
//! ## Algorithm
//! 1. Compute the similarity of the target user to every other user that
//!    shares at least one movie with them in the view
//! 2. Drop users whose similarity is undefined
//! 3. Rank by similarity (descending), ties broken by ascending user id
//! 4. Keep the top `k`
//! 5. The qualifying neighbors for a movie are those among the top `k`
//!    that rated it in the view
//!
//! The tie-break makes the ranking a total order, so the result does not
//! depend on hash map iteration order or thread scheduling.

use crate::similarity::{CoRated, Msd, co_rated_neighbors};
use crate::traits::Unpredictable;
use crate::view::RatingView;
use data_loader::{MovieId, UserId};
use std::cmp::Ordering;

/// A ranked neighbor of the target user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub similarity: f64,
}

/// A neighbor together with its rating of the target movie
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatedNeighbor {
    pub neighbor: Neighbor,
    pub rating: f64,
}

fn by_rank(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Every user with a defined similarity to `user_id`, best first.
///
/// Uses the view's memoized neighborhood when it belongs to `user_id`,
/// otherwise recomputes from scratch. Both paths agree.
pub fn rank_neighbors(view: &RatingView<'_>, metric: &Msd, user_id: UserId) -> Vec<Neighbor> {
    let mut ranked = candidates(view, metric, user_id);
    ranked.sort_unstable_by(by_rank);
    ranked
}

/// The `k` users most similar to `user_id`, best first
pub fn nearest_neighbors(
    view: &RatingView<'_>,
    metric: &Msd,
    user_id: UserId,
    k: usize,
) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }
    let mut nearest = candidates(view, metric, user_id);
    if nearest.len() > k {
        nearest.select_nth_unstable_by(k - 1, by_rank);
        nearest.truncate(k);
    }
    nearest.sort_unstable_by(by_rank);
    nearest
}

/// Neighbors among the top `k` that rated `movie_id`, best first
pub fn qualifying_neighbors(
    view: &RatingView<'_>,
    metric: &Msd,
    user_id: UserId,
    movie_id: MovieId,
    k: usize,
) -> Vec<RatedNeighbor> {
    nearest_neighbors(view, metric, user_id, k)
        .into_iter()
        .filter_map(|neighbor| {
            view.rating(neighbor.user_id, movie_id)
                .map(|rating| RatedNeighbor { neighbor, rating })
        })
        .collect()
}

fn candidates(view: &RatingView<'_>, metric: &Msd, user_id: UserId) -> Vec<Neighbor> {
    let to_neighbor = |(other, stats): (UserId, CoRated)| {
        metric
            .from_co_rated(&stats)
            .map(|similarity| Neighbor {
                user_id: other,
                similarity,
            })
    };

    match view.neighborhood().filter(|n| n.anchor() == user_id) {
        Some(neighborhood) => neighborhood
            .co_rated_all(view)
            .filter_map(to_neighbor)
            .collect(),
        None => co_rated_neighbors(view, user_id)
            .into_iter()
            .filter_map(to_neighbor)
            .collect(),
    }
}

/// `sum(w * x) / sum(w)` over `(weight, value)` terms.
///
/// No terms at all means no qualifying neighbor; a zero weight sum is
/// reported separately instead of dividing by zero.
pub fn weighted_average(
    terms: impl IntoIterator<Item = (f64, f64)>,
) -> Result<f64, Unpredictable> {
    let mut count = 0usize;
    let mut weighted = 0.0;
    let mut weights = 0.0;
    for (weight, value) in terms {
        count += 1;
        weighted += weight * value;
        weights += weight;
    }

    if count == 0 {
        Err(Unpredictable::NoNeighbors)
    } else if weights == 0.0 {
        Err(Unpredictable::ZeroWeight)
    } else {
        Ok(weighted / weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Neighborhood;
    use data_loader::{Rating, RatingStore};

    /// User 1 agrees perfectly with 2 and 3, a little less with 4,
    /// and shares nothing with 5
    fn create_test_store() -> RatingStore {
        RatingStore::from_ratings(vec![
            Rating::new(1, 10, 4.0),
            Rating::new(1, 20, 2.0),
            Rating::new(2, 10, 4.0),
            Rating::new(2, 30, 5.0),
            Rating::new(3, 20, 2.0),
            Rating::new(3, 30, 3.0),
            Rating::new(4, 10, 3.0),
            Rating::new(4, 30, 1.0),
            Rating::new(5, 40, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_rank_breaks_ties_by_user_id() {
        let store = create_test_store();
        let ranked = rank_neighbors(&RatingView::full(&store), &Msd::default(), 1);

        let ids: Vec<UserId> = ranked.iter().map(|n| n.user_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(ranked[0].similarity, 1.0);
        assert_eq!(ranked[1].similarity, 1.0);
        assert!(ranked[2].similarity < 1.0);
    }

    #[test]
    fn test_nearest_neighbors_truncates() {
        let store = create_test_store();
        let view = RatingView::full(&store);
        let metric = Msd::default();

        let nearest = nearest_neighbors(&view, &metric, 1, 2);
        let ids: Vec<UserId> = nearest.iter().map(|n| n.user_id).collect();
        assert_eq!(ids, vec![2, 3]);

        assert!(nearest_neighbors(&view, &metric, 1, 0).is_empty());
        assert_eq!(nearest_neighbors(&view, &metric, 1, 50).len(), 3);
    }

    #[test]
    fn test_qualifying_neighbors_are_drawn_from_top_k() {
        let store = create_test_store();
        let view = RatingView::full(&store);
        let metric = Msd::default();

        // users 2, 3 and 4 all rated movie 30 but only the top one is kept
        let qualifying = qualifying_neighbors(&view, &metric, 1, 30, 1);
        assert_eq!(qualifying.len(), 1);
        assert_eq!(qualifying[0].neighbor.user_id, 2);
        assert_eq!(qualifying[0].rating, 5.0);

        // top two are 2 and 3; only 2 rated movie 10 besides user 4
        let qualifying = qualifying_neighbors(&view, &metric, 1, 10, 2);
        let ids: Vec<UserId> = qualifying.iter().map(|n| n.neighbor.user_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_memoized_and_fresh_rankings_agree() {
        let store = create_test_store();
        let metric = Msd::default();
        let neighborhood = Neighborhood::of(&store, 1);

        for held_out in store.user_ratings(1) {
            let fresh = RatingView::without(&store, *held_out).unwrap();
            let memo = fresh.with_neighborhood(&neighborhood);

            assert_eq!(rank_neighbors(&fresh, &metric, 1), rank_neighbors(&memo, &metric, 1));
        }
    }

    #[test]
    fn test_neighborhood_of_other_user_is_ignored() {
        let store = create_test_store();
        let metric = Msd::default();
        let other = Neighborhood::of(&store, 2);
        let view = RatingView::full(&store).with_neighborhood(&other);

        let ids: Vec<UserId> = rank_neighbors(&view, &metric, 1)
            .iter()
            .map(|n| n.user_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_weighted_average() {
        assert_eq!(weighted_average([(1.0, 4.0), (3.0, 2.0)]), Ok(2.5));
        assert_eq!(weighted_average([]), Err(Unpredictable::NoNeighbors));
        assert_eq!(
            weighted_average([(0.0, 4.0), (0.0, 2.0)]),
            Err(Unpredictable::ZeroWeight)
        );
    }
}

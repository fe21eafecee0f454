//! Evaluation records and aggregated results.

use data_loader::{MovieId, Rating, UserId};
use predictors::{Prediction, Unpredictable};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of one leave-one-out trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub actual: f64,
    /// `None` when the predictor could not produce a score
    pub predicted: Option<f64>,
    pub neighbors: usize,
    pub unpredictable: Option<Unpredictable>,
}

impl EvaluationRecord {
    pub fn new(rating: Rating, prediction: Prediction) -> Self {
        let unpredictable = match prediction {
            Prediction::Unpredictable(reason) => Some(reason),
            Prediction::Score { .. } => None,
        };
        Self {
            user_id: rating.user_id,
            movie_id: rating.movie_id,
            actual: rating.rating,
            predicted: prediction.score(),
            neighbors: prediction.neighbors(),
            unpredictable,
        }
    }

    pub fn is_predictable(&self) -> bool {
        self.predicted.is_some()
    }

    pub fn squared_error(&self) -> Option<f64> {
        self.predicted.map(|p| (self.actual - p).powi(2))
    }
}

/// All records of one (predictor, neighborhood size) configuration
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    predictor: String,
    max_neighbors: usize,
    records: Vec<EvaluationRecord>,
    rmse: Option<f64>,
    coverage: f64,
    elapsed: Duration,
}

impl EvaluationResult {
    pub fn new(
        predictor: impl Into<String>,
        max_neighbors: usize,
        records: Vec<EvaluationRecord>,
        elapsed: Duration,
    ) -> Self {
        let (predictable, sum_squared) = records
            .iter()
            .filter_map(EvaluationRecord::squared_error)
            .fold((0usize, 0.0), |(n, sum), err| (n + 1, sum + err));

        let rmse = (predictable > 0).then(|| (sum_squared / predictable as f64).sqrt());
        let coverage = if records.is_empty() {
            0.0
        } else {
            predictable as f64 / records.len() as f64
        };

        Self {
            predictor: predictor.into(),
            max_neighbors,
            records,
            rmse,
            coverage,
            elapsed,
        }
    }

    pub fn predictor(&self) -> &str {
        &self.predictor
    }

    pub fn max_neighbors(&self) -> usize {
        self.max_neighbors
    }

    /// Records in (user, movie) order
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// Root-mean-squared error over predictable trials, `None` if there were none
    pub fn rmse(&self) -> Option<f64> {
        self.rmse
    }

    /// Fraction of trials that produced a score
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    /// Wall-clock time from the first trial to the last
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn predictable_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_predictable()).count()
    }

    /// How many trials failed for each reason
    pub fn unpredictable_by_reason(&self) -> HashMap<Unpredictable, usize> {
        let mut counts = HashMap::new();
        for reason in self.records.iter().filter_map(|r| r.unpredictable) {
            *counts.entry(reason).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> EvaluationSummary {
        let mut unpredictable: Vec<(Unpredictable, usize)> =
            self.unpredictable_by_reason().into_iter().collect();
        unpredictable.sort_by_key(|(reason, _)| *reason);

        EvaluationSummary {
            predictor: self.predictor.clone(),
            max_neighbors: self.max_neighbors,
            total: self.total_count(),
            predictable: self.predictable_count(),
            rmse: self.rmse,
            coverage: self.coverage,
            elapsed_ms: self.elapsed.as_secs_f64() * 1000.0,
            unpredictable,
        }
    }
}

/// Aggregate view of an `EvaluationResult`, without the per-trial records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub predictor: String,
    pub max_neighbors: usize,
    pub total: usize,
    pub predictable: usize,
    pub rmse: Option<f64>,
    pub coverage: f64,
    pub elapsed_ms: f64,
    pub unpredictable: Vec<(Unpredictable, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(user_id: UserId, actual: f64, predicted: f64) -> EvaluationRecord {
        EvaluationRecord::new(
            Rating::new(user_id, 1, actual),
            Prediction::Score {
                value: predicted,
                neighbors: 3,
            },
        )
    }

    fn missed(user_id: UserId, actual: f64) -> EvaluationRecord {
        EvaluationRecord::new(
            Rating::new(user_id, 1, actual),
            Prediction::Unpredictable(Unpredictable::NoNeighbors),
        )
    }

    #[test]
    fn test_record_keeps_unpredictable_distinct_from_zero() {
        let zero = scored(1, 3.0, 0.0);
        let none = missed(2, 3.0);

        assert_eq!(zero.predicted, Some(0.0));
        assert_eq!(zero.squared_error(), Some(9.0));
        assert_eq!(none.predicted, None);
        assert_eq!(none.squared_error(), None);
        assert_eq!(none.unpredictable, Some(Unpredictable::NoNeighbors));
    }

    #[test]
    fn test_rmse_and_coverage() {
        let records = vec![
            scored(1, 4.0, 3.0),
            scored(2, 2.0, 5.0),
            missed(3, 1.0),
            missed(4, 2.0),
        ];
        let result = EvaluationResult::new("msd", 10, records, Duration::from_millis(5));

        // sqrt((1 + 9) / 2)
        assert!((result.rmse().unwrap() - 5.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(result.coverage(), 0.5);
        assert_eq!(result.total_count(), 4);
        assert_eq!(result.predictable_count(), 2);
        assert_eq!(result.max_neighbors(), 10);
        assert_eq!(result.predictor(), "msd");
    }

    #[test]
    fn test_no_predictable_trials() {
        let result = EvaluationResult::new("msd", 10, vec![missed(1, 3.0)], Duration::ZERO);
        assert_eq!(result.rmse(), None);
        assert_eq!(result.coverage(), 0.0);
        assert_eq!(
            result.unpredictable_by_reason().get(&Unpredictable::NoNeighbors),
            Some(&1)
        );
    }

    #[test]
    fn test_summary() {
        let records = vec![scored(1, 4.0, 4.0), missed(2, 1.0)];
        let summary =
            EvaluationResult::new("resnick", 20, records, Duration::from_millis(250)).summary();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.predictable, 1);
        assert_eq!(summary.rmse, Some(0.0));
        assert_eq!(summary.elapsed_ms, 250.0);
        assert_eq!(summary.unpredictable, vec![(Unpredictable::NoNeighbors, 1)]);
    }
}

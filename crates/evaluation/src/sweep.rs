//! Neighborhood-size sweeps.

use crate::error::{EvaluationError, Result};
use crate::leave_one_out::LeaveOneOut;
use crate::record::EvaluationResult;
use predictors::Predictor;

/// An ordered list of neighborhood sizes to evaluate a predictor at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodSweep {
    sizes: Vec<usize>,
}

impl NeighborhoodSweep {
    /// Validate `sizes`: non-empty, every size at least 1, strictly ascending.
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(EvaluationError::InvalidSweep(
                "no neighborhood sizes given".to_string(),
            ));
        }
        if sizes.contains(&0) {
            return Err(EvaluationError::InvalidSweep(
                "neighborhood sizes must be at least 1".to_string(),
            ));
        }
        if let Some(pair) = sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(EvaluationError::InvalidSweep(format!(
                "sizes must be strictly ascending, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { sizes })
    }

    /// 10, 20, ..., 100, 200, 300
    pub fn reference() -> Self {
        let sizes = (1..=10).map(|i| i * 10).chain([200, 300]).collect();
        Self { sizes }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Evaluate `predictor` at each size in order.
    ///
    /// Results are produced lazily so callers can write each one out before
    /// the next, larger neighborhood starts.
    pub fn run<'s>(
        &'s self,
        evaluator: &'s LeaveOneOut<'s>,
        predictor: &'s dyn Predictor,
    ) -> impl Iterator<Item = Result<EvaluationResult>> + 's {
        self.sizes
            .iter()
            .map(move |&max_neighbors| evaluator.evaluate(predictor, max_neighbors))
    }
}

impl Default for NeighborhoodSweep {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Rating, RatingStore};
    use predictors::MsdKnnPredictor;

    #[test]
    fn test_reference_sizes() {
        assert_eq!(
            NeighborhoodSweep::reference().sizes(),
            &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 200, 300]
        );
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(matches!(
            NeighborhoodSweep::new(vec![]),
            Err(EvaluationError::InvalidSweep(_))
        ));
        assert!(matches!(
            NeighborhoodSweep::new(vec![0, 10]),
            Err(EvaluationError::InvalidSweep(_))
        ));
        assert!(matches!(
            NeighborhoodSweep::new(vec![10, 10]),
            Err(EvaluationError::InvalidSweep(_))
        ));
        assert!(matches!(
            NeighborhoodSweep::new(vec![20, 10]),
            Err(EvaluationError::InvalidSweep(_))
        ));
    }

    #[test]
    fn test_run_yields_one_result_per_size() {
        let store = RatingStore::from_ratings(vec![
            Rating::new(1, 1, 4.0),
            Rating::new(1, 2, 3.0),
            Rating::new(2, 1, 5.0),
            Rating::new(2, 2, 2.0),
            Rating::new(3, 2, 1.0),
        ])
        .unwrap();
        let evaluator = LeaveOneOut::new(&store).unwrap();
        let sweep = NeighborhoodSweep::new(vec![1, 2, 5]).unwrap();
        let predictor = MsdKnnPredictor::new();

        let sizes: Vec<usize> = sweep
            .run(&evaluator, &predictor)
            .map(|result| result.unwrap().max_neighbors())
            .collect();
        assert_eq!(sizes, vec![1, 2, 5]);
    }
}

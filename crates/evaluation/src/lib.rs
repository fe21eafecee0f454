//! Leave-one-out evaluation of rating predictors.
//!
//! This crate provides:
//! - `LeaveOneOut` for hiding each rating in turn and predicting it back
//! - `EvaluationResult` with per-trial records, RMSE and coverage
//! - `NeighborhoodSweep` for evaluating a predictor across neighborhood sizes
//!
//! ## Example Usage
//! ```ignore
//! use evaluation::{LeaveOneOut, NeighborhoodSweep};
//! use predictors::MsdKnnPredictor;
//!
//! let evaluator = LeaveOneOut::new(&store)?;
//! for result in NeighborhoodSweep::reference().run(&evaluator, &MsdKnnPredictor::new()) {
//!     let result = result?;
//!     println!("N={} rmse={:?}", result.max_neighbors(), result.rmse());
//! }
//! ```

pub mod error;
pub mod record;
pub mod leave_one_out;
pub mod sweep;

// Re-export main types
pub use error::{EvaluationError, Result};
pub use leave_one_out::LeaveOneOut;
pub use record::{EvaluationRecord, EvaluationResult, EvaluationSummary};
pub use sweep::NeighborhoodSweep;

//! # Predictors Crate
//!
//! Neighborhood-based rating prediction over a `RatingStore`.
//!
//! ## Components
//!
//! ### RatingView
//! The store with at most one rating hidden, as seen during a leave-one-out
//! trial. Means are updated in O(1) instead of being recomputed.
//!
//! ### Similarity
//! Mean-Squared-Difference similarity between users over co-rated movies,
//! plus a memoized per-user `Neighborhood`.
//!
//! ### Predictors
//! - **Baseline**: user mean, then movie mean, then global mean
//! - **MSD k-NN**: similarity-weighted average of neighbor ratings
//! - **Resnick k-NN**: user mean plus similarity-weighted neighbor deviations
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use predictors::{MsdKnnPredictor, Predictor, RatingView};
//!
//! let store = RatingStore::load_from_file(Path::new("data/ml-100k/u.data"))?;
//! let view = RatingView::full(&store);
//!
//! let prediction = MsdKnnPredictor::new().predict(&view, 1, 242, 30);
//! println!("{:?}", prediction.score());
//! ```

// Public modules
pub mod view;
pub mod similarity;
pub mod neighbors;
pub mod traits;
pub mod baseline;
pub mod msd_knn;
pub mod resnick_knn;

// Re-export commonly used types
pub use baseline::BaselinePredictor;
pub use msd_knn::MsdKnnPredictor;
pub use neighbors::{Neighbor, RatedNeighbor};
pub use resnick_knn::ResnickKnnPredictor;
pub use similarity::{CoRated, Msd, Neighborhood, RatingScale};
pub use traits::{Prediction, Predictor, Unpredictable};
pub use view::RatingView;

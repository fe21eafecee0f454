//! # Data Loader Crate
//!
//! Loads a ratings dataset and indexes it into an immutable `RatingStore`.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (UserId, MovieId, Rating, RatingSummary, RatingStore)
//! - **parser**: Parse flat ratings files (`::`, TAB or comma separated)
//! - **index**: Build and validate the store
//! - **stats**: Descriptive statistics over the store
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use std::path::Path;
//!
//! let store = RatingStore::load_from_file(Path::new("data/ml-100k/u.data"))?;
//!
//! let ratings = store.user_ratings(1);
//! let mean = store.user_summary(1).and_then(|s| s.mean());
//! println!("User 1 rated {} movies, mean {:?}", ratings.len(), mean);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod stats;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use stats::{DatasetStats, EntityStats};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    Rating,
    RatingStore,
    RatingSummary,
};

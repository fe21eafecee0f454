//! Example: Predict one rating with every predictor
//!
//! Run with: cargo run --package predictors --example predict_rating
//!
//! This example shows how to:
//! 1. Load a ratings file
//! 2. Hide one rating, as a leave-one-out trial would
//! 3. Rank the user's nearest neighbors
//! 4. Predict the hidden rating with each predictor

use data_loader::RatingStore;
use predictors::neighbors::nearest_neighbors;
use predictors::{
    BaselinePredictor, Msd, MsdKnnPredictor, Predictor, RatingView, ResnickKnnPredictor,
};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Leave-One-Out Prediction Example ===\n");

    let start = Instant::now();
    let store = RatingStore::load_from_file(Path::new("data/ml-100k/u.data"))?;
    println!("Loaded dataset in {:?}\n", start.elapsed());

    // Hide the first rating of user 1
    let user_id = 1;
    let hidden = *store
        .user_ratings(user_id)
        .first()
        .ok_or_else(|| anyhow::anyhow!("User {} has no ratings", user_id))?;
    let view = RatingView::without(&store, hidden)
        .ok_or_else(|| anyhow::anyhow!("Rating {:?} is not in the store", hidden))?;
    println!(
        "Hidden rating: user {} gave movie {} a {}",
        hidden.user_id, hidden.movie_id, hidden.rating
    );

    // Show top 5 neighbors
    let start = Instant::now();
    let nearest = nearest_neighbors(&view, &Msd::default(), user_id, 5);
    println!("\nTop 5 neighbors (ranked in {:?}):", start.elapsed());
    for (i, neighbor) in nearest.iter().enumerate() {
        let rated = view
            .rating(neighbor.user_id, hidden.movie_id)
            .map(|r| format!("rated it {}", r))
            .unwrap_or_else(|| "did not rate it".to_string());
        println!(
            "  {}. user {} (similarity {:.4}) {}",
            i + 1,
            neighbor.user_id,
            neighbor.similarity,
            rated
        );
    }

    // Predict with every predictor
    let predictors: Vec<Box<dyn Predictor>> = vec![
        Box::new(BaselinePredictor),
        Box::new(MsdKnnPredictor::new()),
        Box::new(ResnickKnnPredictor::new()),
    ];

    println!("\nPredictions (max 50 neighbors):");
    for predictor in &predictors {
        let prediction = predictor.predict(&view, user_id, hidden.movie_id, 50);
        match prediction.score() {
            Some(score) => println!(
                "  {:<8} {:.3} (error {:+.3}, {} neighbors)",
                predictor.name(),
                score,
                score - hidden.rating,
                prediction.neighbors()
            ),
            None => println!("  {:<8} unpredictable: {:?}", predictor.name(), prediction),
        }
    }

    Ok(())
}

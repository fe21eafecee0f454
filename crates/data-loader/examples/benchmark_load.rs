use data_loader::{DatasetStats, RatingStore};
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/ml-100k/u.data");

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let store = RatingStore::load_from_file(path).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let stats = DatasetStats::compute(&store);

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", stats.user_count);
    println!("Movies: {}", stats.movie_count);
    println!("Ratings: {}", stats.rating_count);
    println!("Density: {:.4}", stats.density);
    println!(
        "\nPerformance: {:.0} ratings/second",
        stats.rating_count as f64 / elapsed.as_secs_f64()
    );
}

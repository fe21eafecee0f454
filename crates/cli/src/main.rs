mod report;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::stats::{per_movie_stats, per_user_stats};
use data_loader::{DatasetStats, MovieId, Rating, RatingStore, UserId};
use evaluation::{EvaluationResult, EvaluationSummary, LeaveOneOut, NeighborhoodSweep};
use predictors::neighbors::qualifying_neighbors;
use predictors::similarity::co_rated;
use predictors::{
    BaselinePredictor, Msd, MsdKnnPredictor, Predictor, RatingScale, RatingView,
    ResnickKnnPredictor,
};
use report::{result_stem, ReportWriter, RunSummary};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// cf-eval - Leave-one-out evaluation of neighborhood collaborative filtering
#[derive(Parser)]
#[command(name = "cf-eval")]
#[command(
    about = "Evaluate neighborhood collaborative filtering with leave-one-out",
    long_about = None
)]
struct Cli {
    /// Ratings file (`::`, TAB or comma separated)
    #[arg(short, long, global = true, default_value = "data/ml-100k/u.data")]
    data_file: PathBuf,

    /// Directory for CSV and JSON output
    #[arg(short, long, global = true, default_value = "results")]
    output_dir: PathBuf,

    /// Worker threads for the evaluator (default: one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Lowest score of the rating scale, used to normalize similarities
    #[arg(long, global = true, default_value_t = 0.5)]
    scale_min: f64,

    /// Highest score of the rating scale
    #[arg(long, global = true, default_value_t = 5.0)]
    scale_max: f64,

    /// Take the rating scale from the lowest and highest scores in the data
    #[arg(long, global = true)]
    observed_scale: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dataset statistics and write per-user and per-movie tables
    Stats,

    /// Run leave-one-out for every predictor and neighborhood size
    Evaluate {
        /// Neighborhood sizes to sweep, strictly ascending
        #[arg(
            long,
            value_delimiter = ',',
            default_values_t = NeighborhoodSweep::reference().sizes().to_vec()
        )]
        neighbors: Vec<usize>,

        /// Do not evaluate the baseline predictor
        #[arg(long)]
        skip_baseline: bool,

        /// Do not evaluate the MSD k-NN predictor
        #[arg(long)]
        skip_msd: bool,

        /// Do not evaluate the Resnick k-NN predictor
        #[arg(long)]
        skip_resnick: bool,
    },

    /// Show the MSD similarity of two users
    Similarity {
        #[arg(long)]
        user_a: UserId,

        #[arg(long)]
        user_b: UserId,
    },

    /// Predict one rating with every predictor
    Predict {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        movie: MovieId,

        /// Neighborhood size for the k-NN predictors
        #[arg(long, default_value = "30")]
        neighbors: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker thread pool")?;
    }

    println!("Loading ratings from {}...", cli.data_file.display());
    let start = Instant::now();
    let store = RatingStore::load_from_file(&cli.data_file)
        .with_context(|| format!("Failed to load ratings from {}", cli.data_file.display()))?;
    println!(
        "{} Loaded {} ratings in {:?}",
        "✓".green(),
        store.len(),
        start.elapsed()
    );

    let scale = rating_scale(&cli, &store)?;
    tracing::info!("Rating scale {}..{}", scale.min(), scale.max());

    // Dispatch to appropriate command handler
    match &cli.command {
        Commands::Stats => {
            handle_stats(&store, &cli.output_dir)?;
        }
        Commands::Evaluate {
            neighbors,
            skip_baseline,
            skip_msd,
            skip_resnick,
        } => {
            let selection = Selection {
                baseline: !skip_baseline,
                msd: !skip_msd,
                resnick: !skip_resnick,
            };
            handle_evaluate(&store, scale, &cli, neighbors, selection)?
        }
        Commands::Similarity { user_a, user_b } => {
            handle_similarity(&store, scale, *user_a, *user_b)?
        }
        Commands::Predict {
            user,
            movie,
            neighbors,
        } => handle_predict(&store, scale, *user, *movie, *neighbors)?,
    }

    Ok(())
}

fn rating_scale(cli: &Cli, store: &RatingStore) -> Result<RatingScale> {
    if cli.observed_scale {
        RatingScale::observed(store)
            .ok_or_else(|| anyhow!("Cannot derive a rating scale: every score is the same"))
    } else {
        RatingScale::new(cli.scale_min, cli.scale_max).ok_or_else(|| {
            anyhow!(
                "Invalid rating scale {}..{}: max must be greater than min",
                cli.scale_min,
                cli.scale_max
            )
        })
    }
}

/// Handle the 'stats' command
fn handle_stats(store: &RatingStore, output_dir: &Path) -> Result<DatasetStats> {
    let stats = DatasetStats::compute(store);
    print_dataset_stats(&stats);

    let writer = ReportWriter::create(output_dir)?;
    let users = writer.write_entity_stats("stats_user", &per_user_stats(store))?;
    let movies = writer.write_entity_stats("stats_movie", &per_movie_stats(store))?;
    println!(
        "{} Wrote {} and {}",
        "✓".green(),
        users.display(),
        movies.display()
    );
    Ok(stats)
}

/// Which predictors the 'evaluate' command runs
#[derive(Debug, Clone, Copy)]
struct Selection {
    baseline: bool,
    msd: bool,
    resnick: bool,
}

/// Handle the 'evaluate' command
fn handle_evaluate(
    store: &RatingStore,
    scale: RatingScale,
    cli: &Cli,
    neighbors: &[usize],
    selection: Selection,
) -> Result<()> {
    let sweep = NeighborhoodSweep::new(neighbors.to_vec())?;
    let evaluator = LeaveOneOut::new(store)?;
    let stats = handle_stats(store, &cli.output_dir)?;
    let writer = ReportWriter::create(&cli.output_dir)?;

    println!("\n{}", "Leave-one-out evaluation:".bold().blue());
    let mut summaries: Vec<EvaluationSummary> = Vec::new();

    if selection.baseline {
        // The baseline ignores N; use every user so it is never the limit
        let result = evaluator.evaluate(&BaselinePredictor, store.user_ids().len())?;
        let path = writer.write_result(&result_stem(&result, false), &result)?;
        print_result(&result, &path);
        summaries.push(result.summary());
    }

    let mut knn: Vec<Box<dyn Predictor>> = Vec::new();
    if selection.msd {
        knn.push(Box::new(MsdKnnPredictor::new().with_scale(scale)));
    }
    if selection.resnick {
        knn.push(Box::new(ResnickKnnPredictor::new().with_scale(scale)));
    }

    for predictor in &knn {
        for result in sweep.run(&evaluator, predictor.as_ref()) {
            let result = result?;
            let path = writer.write_result(&result_stem(&result, true), &result)?;
            print_result(&result, &path);
            summaries.push(result.summary());
        }
    }

    let summary_path = writer.write_summary(&RunSummary {
        data_file: cli.data_file.display().to_string(),
        scale_min: scale.min(),
        scale_max: scale.max(),
        dataset: &stats,
        results: &summaries,
    })?;
    println!(
        "\n{} {} configurations written to {} ({})",
        "✓".green(),
        summaries.len(),
        writer.dir().display(),
        summary_path.display()
    );
    Ok(())
}

/// Handle the 'similarity' command
fn handle_similarity(store: &RatingStore, scale: RatingScale, a: UserId, b: UserId) -> Result<()> {
    for user in [a, b] {
        if store.user_summary(user).is_none() {
            bail!("User {} not found", user);
        }
    }

    let view = RatingView::full(store);
    let stats = co_rated(&view, a, b);
    let metric = Msd::new(scale);

    println!("{}", format!("Users {} and {}:", a, b).bold().blue());
    println!("{}Co-rated movies: {}", "• ".green(), stats.count);
    match stats.mean_squared_diff() {
        Some(msd) => println!("{}Mean squared difference: {:.4}", "• ".green(), msd),
        None => println!("{}Mean squared difference: undefined", "• ".green()),
    }
    match metric.from_co_rated(&stats) {
        Some(similarity) => println!(
            "{}Similarity: {}",
            "• ".cyan(),
            format!("{:.4}", similarity).bold()
        ),
        None => println!(
            "{}Similarity: {}",
            "• ".cyan(),
            "undefined (no co-rated movies)".yellow()
        ),
    }
    Ok(())
}

/// Handle the 'predict' command
///
/// A rating the user already gave is hidden first, so the numbers match
/// what leave-one-out would report for it.
fn handle_predict(
    store: &RatingStore,
    scale: RatingScale,
    user: UserId,
    movie: MovieId,
    neighbors: usize,
) -> Result<()> {
    if neighbors == 0 {
        bail!("--neighbors must be at least 1");
    }
    if store.user_summary(user).is_none() {
        bail!("User {} not found", user);
    }

    let actual = store.rating(user, movie);
    let view = actual
        .and_then(|rating| RatingView::without(store, Rating::new(user, movie, rating)))
        .unwrap_or_else(|| RatingView::full(store));

    println!(
        "{}",
        format!("Predictions for user {} on movie {}:", user, movie)
            .bold()
            .blue()
    );
    if let Some(rating) = actual {
        println!("{}Actual rating (hidden): {}", "• ".green(), rating);
    }

    let predictors: Vec<Box<dyn Predictor>> = vec![
        Box::new(BaselinePredictor),
        Box::new(MsdKnnPredictor::new().with_scale(scale)),
        Box::new(ResnickKnnPredictor::new().with_scale(scale)),
    ];
    for predictor in &predictors {
        let prediction = predictor.predict(&view, user, movie, neighbors);
        match prediction.score() {
            Some(score) => println!(
                "{}{:<10} {:.3} ({} neighbors)",
                "• ".cyan(),
                predictor.name(),
                score,
                prediction.neighbors()
            ),
            None => println!(
                "{}{:<10} {}",
                "• ".cyan(),
                predictor.name(),
                "unpredictable".yellow()
            ),
        }
    }

    let rated = qualifying_neighbors(&view, &Msd::new(scale), user, movie, neighbors);
    if !rated.is_empty() {
        println!("Nearest neighbors who rated movie {}:", movie);
        for neighbor in rated.iter().take(10) {
            println!(
                "  - user {} (similarity {:.4}) rated {}",
                neighbor.neighbor.user_id, neighbor.neighbor.similarity, neighbor.rating
            );
        }
    }
    Ok(())
}

/// Helper function to print dataset statistics
fn print_dataset_stats(stats: &DatasetStats) {
    println!("{}", "Dataset statistics:".bold().blue());
    println!("{}Users: {}", "• ".green(), stats.user_count);
    println!("{}Movies: {}", "• ".green(), stats.movie_count);
    println!("{}Ratings: {}", "• ".green(), stats.rating_count);
    println!("{}Density: {:.4}", "• ".green(), stats.density);
    if let Some(mean) = stats.mean_rating {
        println!("{}Mean rating: {:.3}", "• ".green(), mean);
    }

    let largest = stats.histogram.values().copied().max().unwrap_or(0);
    println!("Rating distribution:");
    for (score, count) in stats.histogram_scores() {
        let width = if largest > 0 { count * 40 / largest } else { 0 };
        println!("  {:>4.1} {:>8} {}", score, count, "█".repeat(width).cyan());
    }
}

/// Helper function to print one configuration's summary line
fn print_result(result: &EvaluationResult, path: &Path) {
    let rmse = result
        .rmse()
        .map_or_else(|| "NA".to_string(), |rmse| format!("{:.4}", rmse));
    println!(
        "{:<10} N={:<5} rmse={} coverage={} elapsed={:.1} ms -> {}",
        result.predictor().bold(),
        result.max_neighbors(),
        rmse.green(),
        format!("{:.4}", result.coverage()).cyan(),
        result.elapsed().as_secs_f64() * 1000.0,
        path.display()
    );
}

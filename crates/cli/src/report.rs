//! Writing statistics and evaluation results to the output directory.

use anyhow::{Context, Result};
use data_loader::{DatasetStats, EntityStats, MovieId, UserId};
use evaluation::{EvaluationResult, EvaluationSummary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Written in place of a score for unpredictable trials
const UNPREDICTABLE: &str = "NA";

#[derive(Serialize)]
struct ResultRow {
    user_id: UserId,
    movie_id: MovieId,
    actual: String,
    predicted: String,
    neighbors: usize,
}

/// Everything `summary.json` holds about one run
#[derive(Serialize)]
pub struct RunSummary<'a> {
    pub data_file: String,
    pub scale_min: f64,
    pub scale_max: f64,
    pub dataset: &'a DatasetStats,
    pub results: &'a [EvaluationSummary],
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create the output directory if needed
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write per-user or per-movie statistics as `{stem}.csv`
    pub fn write_entity_stats(&self, stem: &str, rows: &[EntityStats]) -> Result<PathBuf> {
        let path = self.path_for(stem, "csv");
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Write one row per trial as `{stem}.csv`, in the result's record order
    pub fn write_result(&self, stem: &str, result: &EvaluationResult) -> Result<PathBuf> {
        let path = self.path_for(stem, "csv");
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        for record in result.records() {
            writer.serialize(ResultRow {
                user_id: record.user_id,
                movie_id: record.movie_id,
                actual: score_field(record.actual),
                predicted: record
                    .predicted
                    .map_or_else(|| UNPREDICTABLE.to_string(), score_field),
                neighbors: record.neighbors,
            })?;
        }
        writer.flush()?;
        tracing::debug!("Wrote {} rows to {}", result.total_count(), path.display());
        Ok(path)
    }

    pub fn write_summary(&self, summary: &RunSummary<'_>) -> Result<PathBuf> {
        let path = self.path_for("summary", "json");
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, extension))
    }
}

/// Both score columns share one format: shortest round-trip form, always
/// with a decimal point (`4.0`, `3.25`)
fn score_field(value: f64) -> String {
    format!("{:?}", value)
}

/// `baseline` for the baseline, `{name}{N}` for neighborhood predictors
pub fn result_stem(result: &EvaluationResult, neighborhood: bool) -> String {
    if neighborhood {
        format!("{}{}", result.predictor(), result.max_neighbors())
    } else {
        result.predictor().to_string()
    }
}

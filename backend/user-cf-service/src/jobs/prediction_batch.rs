// ============================================
// Prediction Batch Job
// ============================================
//
// One-shot job that completes a rating matrix.
//
// Workflow:
// 1. Generate a seeded random rating matrix
// 2. Compute similarities, neighborhoods and predictions (CPU-bound,
//    runs on the blocking pool)
// 3. Persist the completed matrix to the cache directory
//
// Usage:
//   user-cf-service run --cache-dir .cache

use crate::config::Config;
use crate::models::{PredictionMatrix, RatingMatrix};
use crate::services::PredictionEngine;
use crate::utils::{generate_random_matrix, save_rankings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Prediction batch job statistics
#[derive(Debug, Clone, Default)]
pub struct BatchJobStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub users: usize,
    pub items: usize,
    pub observed_cells: usize,
    pub predicted_cells: usize,
    pub unpredictable_cells: usize,
    pub generation_ms: u64,
    pub prediction_ms: u64,
    pub persist_ms: u64,
    pub total_duration_ms: u64,
    pub output_path: Option<PathBuf>,
}

/// Prediction batch job runner
pub struct PredictionBatchJob {
    config: Config,
}

impl PredictionBatchJob {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().context("Invalid prediction job configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run generation, prediction and persistence once
    pub async fn run(&self) -> Result<BatchJobStats> {
        let start_time = Instant::now();
        let mut stats = BatchJobStats {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        info!(
            users = self.config.num_users,
            items = self.config.num_items,
            k = self.config.k_neighbors,
            seed = self.config.random_seed,
            include_self = self.config.include_self,
            "Starting prediction batch job"
        );

        let stage = Instant::now();
        let matrix = generate_random_matrix(
            self.config.num_users,
            self.config.num_items,
            self.config.min_rating,
            self.config.max_rating,
            self.config.random_seed,
        )
        .context("Failed to generate rating matrix")?;
        stats.generation_ms = stage.elapsed().as_millis() as u64;
        stats.users = matrix.users();
        stats.items = matrix.items();

        let stage = Instant::now();
        let predictions = self.predict(matrix).await?;
        stats.prediction_ms = stage.elapsed().as_millis() as u64;
        stats.observed_cells = predictions.observed_count();
        stats.predicted_cells = predictions.predicted_count();
        stats.unpredictable_cells = predictions.unpredictable_count();

        if stats.unpredictable_cells > 0 {
            warn!(
                unpredictable = stats.unpredictable_cells,
                "Some cells had no neighbor evidence"
            );
        }

        let stage = Instant::now();
        let path = save_rankings(&self.config.cache_dir, &predictions, self.config.k_neighbors)
            .await
            .with_context(|| format!("Failed to save rankings to {}", self.config.cache_dir))?;
        stats.persist_ms = stage.elapsed().as_millis() as u64;
        stats.output_path = Some(path);

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            observed = stats.observed_cells,
            predicted = stats.predicted_cells,
            unpredictable = stats.unpredictable_cells,
            generation_ms = stats.generation_ms,
            prediction_ms = stats.prediction_ms,
            persist_ms = stats.persist_ms,
            duration_ms = stats.total_duration_ms,
            "Prediction batch job completed"
        );

        Ok(stats)
    }

    /// Run the prediction pipeline on the blocking pool
    pub async fn predict(&self, matrix: RatingMatrix) -> Result<PredictionMatrix> {
        let engine = PredictionEngine::new(self.config.prediction_config());

        let predictions = tokio::task::spawn_blocking(move || engine.predict(&matrix))
            .await
            .context("Prediction task panicked")?
            .context("Prediction failed")?;

        Ok(predictions)
    }
}

/// Convenience entry point used by the binary
pub async fn run_prediction_batch_job(config: Config) -> Result<BatchJobStats> {
    PredictionBatchJob::new(config)?.run().await
}

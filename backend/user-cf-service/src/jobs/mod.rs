// ============================================
// Batch Jobs Module
// ============================================
//
// Contains batch job runners for:
// 1. Full-matrix rating prediction
//
// These jobs can be triggered via:
// - CronJob (Kubernetes)
// - Command line (`user-cf-service run`)

pub mod prediction_batch;

pub use prediction_batch::{run_prediction_batch_job, BatchJobStats, PredictionBatchJob};

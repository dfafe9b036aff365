//! User-CF Service - user-based collaborative filtering batch job
//!
//! Completes a user × item rating matrix:
//! - Pearson similarity between users over commonly rated items
//! - Top-k neighbor selection per user
//! - Similarity-weighted deviation-from-mean prediction of unrated cells

pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{CfError, Result};
pub use jobs::{run_prediction_batch_job, BatchJobStats, PredictionBatchJob};
pub use models::{Cell, Neighbor, Neighborhood, PredictionMatrix, RatingMatrix, SimilarityMatrix};
pub use services::{
    NeighborSelector, PredictionConfig, PredictionEngine, SimilarityEngine, UnpredictablePolicy,
};

// Utility functions for user-cf-service

use crate::error::{CfError, Result};
use crate::models::RatingMatrix;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod storage;

pub use storage::{load_rankings, save_rankings, RankingsFile, RANKINGS_FILE};

/// Fully observed matrix of integer ratings drawn uniformly from
/// `min_rating..=max_rating`
///
/// The same seed always produces the same matrix.
pub fn generate_random_matrix(
    users: usize,
    items: usize,
    min_rating: u32,
    max_rating: u32,
    seed: u64,
) -> Result<RatingMatrix> {
    if min_rating == 0 || min_rating > max_rating {
        return Err(CfError::Configuration(format!(
            "invalid rating scale {}..={}",
            min_rating, max_rating
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let ratings = Array2::from_shape_simple_fn((users, items), || {
        rng.gen_range(min_rating..=max_rating) as f64
    });

    RatingMatrix::new(ratings)
}

//! Configuration for the user-CF batch job
use crate::error::{CfError, Result};
use crate::services::{NeighborSelector, PredictionConfig, UnpredictablePolicy};
use serde::Deserialize;

/// Main configuration struct, loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory the completed matrix is written to
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Number of users in the generated matrix
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Number of items in the generated matrix
    #[serde(default = "default_num_items")]
    pub num_items: usize,

    /// Neighborhood size
    #[serde(default = "default_k_neighbors")]
    pub k_neighbors: usize,

    /// Seed for matrix generation
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Lowest generated rating (must be >= 1, zero means unrated)
    #[serde(default = "default_min_rating")]
    pub min_rating: u32,

    /// Highest generated rating
    #[serde(default = "default_max_rating")]
    pub max_rating: u32,

    /// Allow a user to appear in its own neighborhood
    #[serde(default = "default_include_self")]
    pub include_self: bool,

    /// Handling of cells no neighbor rated
    #[serde(default)]
    pub unpredictable_policy: UnpredictablePolicy,
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

fn default_num_users() -> usize {
    100
}

fn default_num_items() -> usize {
    200
}

fn default_k_neighbors() -> usize {
    10
}

fn default_random_seed() -> u64 {
    42
}

fn default_min_rating() -> u32 {
    1
}

fn default_max_rating() -> u32 {
    5
}

fn default_include_self() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            num_users: default_num_users(),
            num_items: default_num_items(),
            k_neighbors: default_k_neighbors(),
            random_seed: default_random_seed(),
            min_rating: default_min_rating(),
            max_rating: default_max_rating(),
            include_self: default_include_self(),
            unpredictable_policy: UnpredictablePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config: Config = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.num_users == 0 || self.num_items == 0 {
            return Err(CfError::Configuration(format!(
                "NUM_USERS and NUM_ITEMS must be positive, got {}x{}",
                self.num_users, self.num_items
            )));
        }
        if self.min_rating == 0 {
            return Err(CfError::Configuration(
                "MIN_RATING must be at least 1, zero is reserved for unrated".to_string(),
            ));
        }
        if self.min_rating > self.max_rating {
            return Err(CfError::Configuration(format!(
                "MIN_RATING ({}) must not exceed MAX_RATING ({})",
                self.min_rating, self.max_rating
            )));
        }
        if self.cache_dir.trim().is_empty() {
            return Err(CfError::Configuration(
                "CACHE_DIR must not be empty".to_string(),
            ));
        }

        NeighborSelector::new(self.k_neighbors, self.include_self, self.num_users)?;
        Ok(())
    }

    pub fn prediction_config(&self) -> PredictionConfig {
        PredictionConfig {
            k: self.k_neighbors,
            include_self: self.include_self,
            policy: self.unpredictable_policy,
        }
    }
}

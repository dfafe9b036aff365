use super::{NeighborSelector, SimilarityEngine};
use crate::error::Result;
use crate::models::{Cell, Neighborhood, PredictionMatrix, RatingMatrix};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What to do with a cell none of the user's neighbors can speak for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpredictablePolicy {
    /// Leave the cell as [`Cell::Unpredictable`]
    #[default]
    Propagate,
    /// Fill the cell with the user's own mean rating
    UserMean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionConfig {
    pub k: usize,
    pub include_self: bool,
    pub policy: UnpredictablePolicy,
}

impl PredictionConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            include_self: true,
            policy: UnpredictablePolicy::Propagate,
        }
    }
}

/// Neighborhood-weighted rating prediction
///
/// For an unrated cell (u, i) with qualifying neighbors n (those who rated i):
///
/// `offset + Σ s_n × (r_{n,i} - m_n) / Σ s_n`
///
/// where `m_n` is the neighbor's mean over its whole row. The batch path
/// offsets by the target user's own mean; the per-user path offsets by the
/// mean of the most similar neighbor.
pub struct PredictionEngine {
    config: PredictionConfig,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Complete every unrated cell of `matrix` in one pass
    pub fn predict(&self, matrix: &RatingMatrix) -> Result<PredictionMatrix> {
        let selector =
            NeighborSelector::new(self.config.k, self.config.include_self, matrix.users())?;

        let similarities = SimilarityEngine::new(matrix).similarity_matrix()?;
        let neighborhoods = selector.select_all(&similarities)?;
        let means = matrix.mean_ratings();

        let rows: Vec<Vec<Cell>> = neighborhoods
            .par_iter()
            .map(|neighborhood| {
                let offset = means[neighborhood.user];
                self.predict_row(matrix, neighborhood, &means, offset)
            })
            .collect();

        let predictions = PredictionMatrix::from_rows(rows)?;

        info!(
            users = matrix.users(),
            items = matrix.items(),
            k = self.config.k,
            predicted = predictions.predicted_count(),
            unpredictable = predictions.unpredictable_count(),
            "Rating predictions computed"
        );

        Ok(predictions)
    }

    /// Per-user variant offset by the most similar neighbor's mean
    ///
    /// Same neighborhood and weighting as [`PredictionEngine::predict`], but
    /// the estimate is anchored on the mean rating of the last member of the
    /// neighborhood instead of `user`'s own mean, so results differ from the
    /// batch path.
    pub fn predict_user_neighbor_offset(
        &self,
        matrix: &RatingMatrix,
        user: usize,
    ) -> Result<Vec<Cell>> {
        let selector =
            NeighborSelector::new(self.config.k, self.config.include_self, matrix.users())?;

        let similarities = SimilarityEngine::new(matrix).similarity_row(user)?;
        let neighborhood = selector.select(user, similarities.view())?;
        let means = matrix.mean_ratings();

        let offset = match neighborhood.last() {
            Some(n) => means[n.user],
            None => means[user],
        };

        debug!(
            user,
            neighbors = neighborhood.len(),
            offset,
            "Per-user prediction with neighbor offset"
        );

        Ok(self.predict_row(matrix, &neighborhood, &means, offset))
    }

    fn predict_row(
        &self,
        matrix: &RatingMatrix,
        neighborhood: &Neighborhood,
        means: &Array1<f64>,
        offset: f64,
    ) -> Vec<Cell> {
        let ratings = matrix.as_array();
        let observed = matrix.observed_mask();
        let user = neighborhood.user;

        ratings
            .row(user)
            .iter()
            .enumerate()
            .map(|(item, &rating)| {
                if observed[[user, item]] {
                    return Cell::Observed(rating);
                }

                let (weighted, total) = neighborhood
                    .iter()
                    .filter(|n| observed[[n.user, item]])
                    .fold((0.0, 0.0), |(weighted, total), n| {
                        let deviation = ratings[[n.user, item]] - means[n.user];
                        (weighted + n.similarity * deviation, total + n.similarity)
                    });

                self.resolve(offset + weighted / total, means[user])
            })
            .collect()
    }

    fn resolve(&self, estimate: f64, user_mean: f64) -> Cell {
        if estimate.is_finite() {
            return Cell::Predicted(estimate);
        }

        match self.config.policy {
            UnpredictablePolicy::Propagate => Cell::Unpredictable,
            UnpredictablePolicy::UserMean => Cell::Predicted(user_mean),
        }
    }
}

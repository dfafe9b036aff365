use crate::error::{CfError, Result};
use crate::models::{RatingMatrix, SimilarityMatrix};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// Pearson similarity between users over their commonly rated items
pub struct SimilarityEngine<'a> {
    matrix: &'a RatingMatrix,
}

impl<'a> SimilarityEngine<'a> {
    pub fn new(matrix: &'a RatingMatrix) -> Self {
        Self { matrix }
    }

    /// Similarity of a single ordered pair
    pub fn similarity(&self, u: usize, v: usize) -> Result<f64> {
        let common = self.matrix.common_items(u, v)?;
        Ok(self.pearson_over(u, v, &common))
    }

    /// Similarity of `user` to every user, itself included
    pub fn similarity_row(&self, user: usize) -> Result<Array1<f64>> {
        self.row_values(user).map(Array1::from_vec)
    }

    /// Full users × users table
    ///
    /// Common-item sets are intersected once per unordered pair, then rows
    /// are scored in parallel against that shared table.
    pub fn similarity_matrix(&self) -> Result<SimilarityMatrix> {
        let users = self.matrix.users();
        let pairs = self.matrix.pairwise_common_items();

        let rows = (0..users)
            .into_par_iter()
            .map(|u| {
                (0..users)
                    .map(|v| {
                        let common = match u.cmp(&v) {
                            Ordering::Equal => self.matrix.rated_items(u)?,
                            Ordering::Less => pairs[pair_index(u, v, users)].1.as_slice(),
                            Ordering::Greater => pairs[pair_index(v, u, users)].1.as_slice(),
                        };
                        Ok(self.pearson_over(u, v, common))
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let scores = Array2::from_shape_vec((users, users), flat)
            .map_err(|e| CfError::ShapeMismatch(e.to_string()))?;

        debug!(users, pairs = pairs.len(), "Similarity matrix computed");

        SimilarityMatrix::new(scores)
    }

    fn row_values(&self, user: usize) -> Result<Vec<f64>> {
        (0..self.matrix.users())
            .map(|other| self.similarity(user, other))
            .collect()
    }

    fn pearson_over(&self, u: usize, v: usize, common: &[usize]) -> f64 {
        let ratings = self.matrix.as_array();
        let lhs: Vec<f64> = common.iter().map(|&i| ratings[[u, i]]).collect();
        let rhs: Vec<f64> = common.iter().map(|&i| ratings[[v, i]]).collect();
        pearson(&lhs, &rhs)
    }
}

/// Position of `(u, v)`, `u < v`, in the lexicographic list of unordered pairs
fn pair_index(u: usize, v: usize, users: usize) -> usize {
    u * users - u * (u + 1) / 2 + (v - u - 1)
}

/// Pearson correlation of two equally long rating vectors
///
/// Formula: Σ(a - ā)(b - b̄) / sqrt(Σ(a - ā)² × Σ(b - b̄)²)
///
/// Empty input or zero variance on either side yields a non-finite ratio,
/// which maps to 0.
pub fn pearson(lhs: &[f64], rhs: &[f64]) -> f64 {
    if lhs.len() != rhs.len() || lhs.is_empty() {
        return 0.0;
    }

    let n = lhs.len() as f64;
    let mean_l = lhs.iter().sum::<f64>() / n;
    let mean_r = rhs.iter().sum::<f64>() / n;

    let (covariance, var_l, var_r) = lhs.iter().zip(rhs.iter()).fold(
        (0.0, 0.0, 0.0),
        |(cov, vl, vr), (&a, &b)| {
            let da = a - mean_l;
            let db = b - mean_r;
            (cov + da * db, vl + da * da, vr + db * db)
        },
    );

    let similarity = covariance / (var_l * var_r).sqrt();
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RatingMatrix {
        RatingMatrix::from_rows(vec![
            vec![5.0, 3.0, 0.0],
            vec![4.0, 0.0, 2.0],
            vec![0.0, 4.0, 3.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_cases() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[4.0], &[2.0]), 0.0);
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 5.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_pearson_known_value() {
        // a = [1, 2, 3, 4], b = [2, 1, 4, 3] -> cov 3, var 5 each -> 0.6
        let s = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]);
        assert!((s - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_single_shared_item_is_neutral() {
        let matrix = sample();
        let engine = SimilarityEngine::new(&matrix);
        assert_eq!(engine.similarity(0, 1).unwrap(), 0.0);
        assert_eq!(engine.similarity(0, 2).unwrap(), 0.0);
        assert_eq!(engine.similarity(1, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_self_similarity() {
        let matrix = sample();
        let engine = SimilarityEngine::new(&matrix);
        // Two distinct ratings -> perfectly self-correlated
        assert!((engine.similarity(0, 0).unwrap() - 1.0).abs() < 1e-12);

        let flat = RatingMatrix::from_rows(vec![vec![3.0, 3.0, 0.0]]).unwrap();
        let engine = SimilarityEngine::new(&flat);
        assert_eq!(engine.similarity(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_disjoint_users() {
        let matrix =
            RatingMatrix::from_rows(vec![vec![5.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 2.0, 4.0]])
                .unwrap();
        let engine = SimilarityEngine::new(&matrix);
        assert_eq!(engine.similarity(0, 1).unwrap(), 0.0);
        assert_eq!(engine.similarity(1, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_row_matches_pairwise() {
        let matrix = RatingMatrix::from_rows(vec![
            vec![5.0, 3.0, 4.0, 0.0],
            vec![4.0, 1.0, 5.0, 2.0],
            vec![1.0, 5.0, 0.0, 3.0],
        ])
        .unwrap();
        let engine = SimilarityEngine::new(&matrix);
        let sims = engine.similarity_matrix().unwrap();

        for u in 0..3 {
            let row = engine.similarity_row(u).unwrap();
            for v in 0..3 {
                let pair = engine.similarity(u, v).unwrap();
                assert_eq!(row[v], pair);
                assert_eq!(sims.get(u, v).unwrap(), pair);
                assert!((-1.0..=1.0).contains(&pair));
            }
        }
        assert!(sims.get(0, 1).unwrap() > 0.0);
        assert!(sims.get(0, 2).unwrap() < 0.0);
    }

    #[test]
    fn test_pair_index_follows_pairwise_order() {
        let matrix = RatingMatrix::from_rows(vec![vec![1.0, 2.0]; 5]).unwrap();
        for (position, ((u, v), _)) in matrix.pairwise_common_items().iter().enumerate() {
            assert_eq!(pair_index(*u, *v, 5), position);
        }
    }

    #[test]
    fn test_matrix_agrees_with_pairwise_on_sparse_input() {
        let matrix = RatingMatrix::from_rows(vec![
            vec![5.0, 0.0, 4.0, 1.0, 0.0, 2.0],
            vec![0.0, 3.0, 4.0, 2.0, 5.0, 0.0],
            vec![1.0, 2.0, 0.0, 5.0, 4.0, 3.0],
            vec![4.0, 0.0, 5.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 3.0, 0.0, 0.0],
            vec![2.0, 4.0, 1.0, 0.0, 3.0, 5.0],
        ])
        .unwrap();
        let engine = SimilarityEngine::new(&matrix);
        let sims = engine.similarity_matrix().unwrap();

        for u in 0..6 {
            for v in 0..6 {
                assert_eq!(sims.get(u, v).unwrap(), engine.similarity(u, v).unwrap());
                assert_eq!(sims.get(u, v).unwrap(), sims.get(v, u).unwrap());
            }
        }
    }

    #[test]
    fn test_out_of_bounds_user() {
        let matrix = sample();
        let engine = SimilarityEngine::new(&matrix);
        assert!(engine.similarity_row(3).is_err());
        assert!(engine.similarity(0, 7).is_err());
    }
}

use crate::error::{CfError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

pub mod prediction;
pub mod rating_matrix;

pub use prediction::{Cell, PredictionMatrix};
pub use rating_matrix::RatingMatrix;

/// users × users similarity table, one independently computed row per user
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Array2<f64>,
}

impl SimilarityMatrix {
    pub fn new(scores: Array2<f64>) -> Result<Self> {
        if scores.nrows() != scores.ncols() {
            return Err(CfError::ShapeMismatch(format!(
                "similarity matrix must be square, got {}x{}",
                scores.nrows(),
                scores.ncols()
            )));
        }
        Ok(Self { scores })
    }

    pub fn users(&self) -> usize {
        self.scores.nrows()
    }

    pub fn get(&self, u: usize, v: usize) -> Result<f64> {
        let users = self.users();
        if let Some(&user) = [u, v].iter().find(|&&x| x >= users) {
            return Err(CfError::UserOutOfBounds { user, users });
        }
        Ok(self.scores[[u, v]])
    }

    pub fn row(&self, user: usize) -> Result<ArrayView1<'_, f64>> {
        let users = self.users();
        if user >= users {
            return Err(CfError::UserOutOfBounds { user, users });
        }
        Ok(self.scores.row(user))
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.scores
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub user: usize,
    pub similarity: f64,
}

/// Top-k neighbors of one user, ascending by similarity
///
/// The least similar of the chosen users comes first, the most similar last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub user: usize,
    pub members: Vec<Neighbor>,
}

impl Neighborhood {
    pub fn indices(&self) -> Vec<usize> {
        self.members.iter().map(|n| n.user).collect()
    }

    pub fn similarities(&self) -> Vec<f64> {
        self.members.iter().map(|n| n.similarity).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Most similar member (last in return order)
    pub fn last(&self) -> Option<&Neighbor> {
        self.members.last()
    }

    pub fn contains(&self, user: usize) -> bool {
        self.members.iter().any(|n| n.user == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_similarity_matrix_shape() {
        assert!(SimilarityMatrix::new(Array2::zeros((2, 3))).is_err());

        let sims = SimilarityMatrix::new(array![[1.0, 0.5], [0.5, 1.0]]).unwrap();
        assert_eq!(sims.users(), 2);
        assert_eq!(sims.get(0, 1).unwrap(), 0.5);
        assert!(matches!(
            sims.get(0, 2),
            Err(CfError::UserOutOfBounds { user: 2, users: 2 })
        ));
        assert!(sims.row(2).is_err());
    }

    #[test]
    fn test_neighborhood_accessors() {
        let hood = Neighborhood {
            user: 0,
            members: vec![
                Neighbor {
                    user: 2,
                    similarity: 0.1,
                },
                Neighbor {
                    user: 1,
                    similarity: 0.9,
                },
            ],
        };
        assert_eq!(hood.indices(), vec![2, 1]);
        assert_eq!(hood.similarities(), vec![0.1, 0.9]);
        assert_eq!(hood.last().map(|n| n.user), Some(1));
        assert!(hood.contains(2));
        assert!(!hood.contains(0));
    }
}

use crate::error::{CfError, Result};
use crate::models::{Neighbor, Neighborhood, SimilarityMatrix};
use ndarray::ArrayView1;

/// Top-k neighbor selection over a similarity row
///
/// Candidates are sorted ascending by similarity with a stable sort, so
/// ties keep ascending user order, and the last `k` are kept. Whether a
/// user may appear in its own neighborhood is controlled by `include_self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSelector {
    k: usize,
    include_self: bool,
    users: usize,
}

impl NeighborSelector {
    /// Validate `k` against the number of candidates
    ///
    /// With `include_self` every user is a candidate, otherwise `users - 1`
    /// are. `k` must lie in `[1, candidates]`.
    pub fn new(k: usize, include_self: bool, users: usize) -> Result<Self> {
        let candidates = if include_self {
            users
        } else {
            users.saturating_sub(1)
        };

        if k == 0 || k > candidates {
            return Err(CfError::InvalidNeighborhoodSize {
                k,
                candidates,
                include_self,
            });
        }

        Ok(Self {
            k,
            include_self,
            users,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn include_self(&self) -> bool {
        self.include_self
    }

    /// Neighborhood of `user` given its similarity to every user
    pub fn select(&self, user: usize, similarities: ArrayView1<'_, f64>) -> Result<Neighborhood> {
        if similarities.len() != self.users {
            return Err(CfError::ShapeMismatch(format!(
                "similarity row has {} entries, expected {}",
                similarities.len(),
                self.users
            )));
        }
        if user >= self.users {
            return Err(CfError::UserOutOfBounds {
                user,
                users: self.users,
            });
        }

        let mut candidates: Vec<Neighbor> = similarities
            .iter()
            .enumerate()
            .filter(|(other, _)| self.include_self || *other != user)
            .map(|(other, &similarity)| Neighbor {
                user: other,
                similarity,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.similarity
                .partial_cmp(&b.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let members = candidates.split_off(candidates.len() - self.k);

        Ok(Neighborhood { user, members })
    }

    /// Neighborhood of every user, in user order
    pub fn select_all(&self, similarities: &SimilarityMatrix) -> Result<Vec<Neighborhood>> {
        (0..similarities.users())
            .map(|user| self.select(user, similarities.row(user)?))
            .collect()
    }
}

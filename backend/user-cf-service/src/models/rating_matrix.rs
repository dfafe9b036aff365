use crate::error::{CfError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Observed user × item ratings
///
/// Built with [`RatingMatrix::new`], a zero cell means "unrated" and every
/// other value is an observed rating. [`RatingMatrix::with_observed`] takes
/// an explicit mask instead, so a completed matrix whose estimates are zero
/// or negative can be fed back in. The observed mask and each user's
/// rated-item index are built once at construction and reused by the
/// similarity and prediction stages.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    ratings: Array2<f64>,
    observed: Array2<bool>,
    rated_items: Vec<Vec<usize>>,
}

impl RatingMatrix {
    /// Build from a dense array
    ///
    /// Rejects empty shapes and entries that are negative or non-finite.
    pub fn new(ratings: Array2<f64>) -> Result<Self> {
        check_shape(ratings.dim())?;

        for ((user, item), &value) in ratings.indexed_iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(CfError::InvalidRating { user, item, value });
            }
        }

        let observed = ratings.mapv(|value| value != 0.0);
        Ok(Self::from_parts(ratings, observed))
    }

    /// Build from values plus an explicit observed mask
    ///
    /// Any finite value is accepted in an observed cell, zero and negative
    /// included. Unobserved cells are stored as zero whatever their input
    /// value, so row means keep counting them as zero.
    pub fn with_observed(ratings: Array2<f64>, observed: Array2<bool>) -> Result<Self> {
        check_shape(ratings.dim())?;
        if ratings.dim() != observed.dim() {
            return Err(CfError::ShapeMismatch(format!(
                "observed mask is {:?}, ratings are {:?}",
                observed.dim(),
                ratings.dim()
            )));
        }

        let mut ratings = ratings;
        for ((user, item), value) in ratings.indexed_iter_mut() {
            if !observed[[user, item]] {
                *value = 0.0;
            } else if !value.is_finite() {
                return Err(CfError::InvalidRating {
                    user,
                    item,
                    value: *value,
                });
            }
        }

        Ok(Self::from_parts(ratings, observed))
    }

    fn from_parts(ratings: Array2<f64>, observed: Array2<bool>) -> Self {
        let rated_items = observed
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, rated)| **rated)
                    .map(|(item, _)| item)
                    .collect()
            })
            .collect();

        Self {
            ratings,
            observed,
            rated_items,
        }
    }

    /// Build from row vectors; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let users = rows.len();
        let items = rows.first().map(Vec::len).unwrap_or(0);

        if let Some((user, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != items) {
            return Err(CfError::ShapeMismatch(format!(
                "row {} has {} items, expected {}",
                user,
                row.len(),
                items
            )));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let ratings = Array2::from_shape_vec((users, items), flat)
            .map_err(|e| CfError::ShapeMismatch(e.to_string()))?;

        Self::new(ratings)
    }

    pub fn users(&self) -> usize {
        self.ratings.nrows()
    }

    pub fn items(&self) -> usize {
        self.ratings.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.ratings.dim()
    }

    /// Dense read-only view
    pub fn as_array(&self) -> &Array2<f64> {
        &self.ratings
    }

    pub fn rating(&self, user: usize, item: usize) -> Result<f64> {
        self.check_user(user)?;
        self.check_item(item)?;
        Ok(self.ratings[[user, item]])
    }

    pub fn is_rated(&self, user: usize, item: usize) -> Result<bool> {
        self.check_user(user)?;
        self.check_item(item)?;
        Ok(self.observed[[user, item]])
    }

    /// Dense observed mask, `true` where a rating is present
    pub fn observed_mask(&self) -> &Array2<bool> {
        &self.observed
    }

    /// Sorted indices of the items `user` rated
    pub fn rated_items(&self, user: usize) -> Result<&[usize]> {
        self.check_user(user)?;
        Ok(&self.rated_items[user])
    }

    pub fn user_ratings(&self, user: usize) -> Result<ArrayView1<'_, f64>> {
        self.check_user(user)?;
        Ok(self.ratings.row(user))
    }

    /// Sorted intersection of the rated-item sets of `u` and `v`
    pub fn common_items(&self, u: usize, v: usize) -> Result<Vec<usize>> {
        let lhs = self.rated_items(u)?;
        let rhs = self.rated_items(v)?;
        Ok(intersect_sorted(lhs, rhs))
    }

    /// Common rated items for every unordered pair `(u, v)` with `u < v`,
    /// in lexicographic pair order
    pub fn pairwise_common_items(&self) -> Vec<((usize, usize), Vec<usize>)> {
        let users = self.users();
        (0..users)
            .flat_map(|u| ((u + 1)..users).map(move |v| (u, v)))
            .map(|(u, v)| {
                let common = intersect_sorted(&self.rated_items[u], &self.rated_items[v]);
                ((u, v), common)
            })
            .collect()
    }

    /// Mean of the user's whole row, unrated cells counted as zero
    pub fn mean_rating(&self, user: usize) -> Result<f64> {
        let row = self.user_ratings(user)?;
        Ok(row.sum() / self.items() as f64)
    }

    /// [`RatingMatrix::mean_rating`] for every user at once
    pub fn mean_ratings(&self) -> Array1<f64> {
        self.ratings.sum_axis(Axis(1)) / self.items() as f64
    }

    /// Number of observed (non-zero) cells
    pub fn observed_count(&self) -> usize {
        self.rated_items.iter().map(Vec::len).sum()
    }

    fn check_user(&self, user: usize) -> Result<()> {
        if user >= self.users() {
            return Err(CfError::UserOutOfBounds {
                user,
                users: self.users(),
            });
        }
        Ok(())
    }

    fn check_item(&self, item: usize) -> Result<()> {
        if item >= self.items() {
            return Err(CfError::ItemOutOfBounds {
                item,
                items: self.items(),
            });
        }
        Ok(())
    }
}

fn check_shape((users, items): (usize, usize)) -> Result<()> {
    if users == 0 || items == 0 {
        return Err(CfError::ShapeMismatch(format!(
            "rating matrix must have at least one user and one item, got {}x{}",
            users, items
        )));
    }
    Ok(())
}

/// Merge-intersect two ascending index lists
fn intersect_sorted(lhs: &[usize], rhs: &[usize]) -> Vec<usize> {
    let mut common = Vec::with_capacity(lhs.len().min(rhs.len()));
    let (mut i, mut j) = (0, 0);

    while i < lhs.len() && j < rhs.len() {
        match lhs[i].cmp(&rhs[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common.push(lhs[i]);
                i += 1;
                j += 1;
            }
        }
    }

    common
}

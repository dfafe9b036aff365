use super::RatingMatrix;
use crate::error::{CfError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// One cell of the completed matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Rating present in the input, copied verbatim
    Observed(f64),
    /// Finite neighborhood estimate
    Predicted(f64),
    /// No neighbor supplied evidence for this cell
    Unpredictable,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Observed(v) | Cell::Predicted(v) => Some(*v),
            Cell::Unpredictable => None,
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, Cell::Observed(_))
    }

    pub fn is_unpredictable(&self) -> bool {
        matches!(self, Cell::Unpredictable)
    }
}

/// Completed matrix, same shape as the input ratings
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMatrix {
    cells: Array2<Cell>,
}

impl PredictionMatrix {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let users = rows.len();
        let items = rows.first().map(Vec::len).unwrap_or(0);
        let flat: Vec<Cell> = rows.into_iter().flatten().collect();

        let cells = Array2::from_shape_vec((users, items), flat)
            .map_err(|e| CfError::ShapeMismatch(e.to_string()))?;

        Ok(Self { cells })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, user: usize, item: usize) -> Result<Cell> {
        let (users, items) = self.shape();
        if user >= users {
            return Err(CfError::UserOutOfBounds { user, users });
        }
        if item >= items {
            return Err(CfError::ItemOutOfBounds { item, items });
        }
        Ok(self.cells[[user, item]])
    }

    pub fn row(&self, user: usize) -> Result<ArrayView1<'_, Cell>> {
        let users = self.cells.nrows();
        if user >= users {
            return Err(CfError::UserOutOfBounds { user, users });
        }
        Ok(self.cells.row(user))
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Dense numeric export; unpredictable cells become NaN
    pub fn to_dense(&self) -> Array2<f64> {
        self.cells.mapv(|cell| cell.value().unwrap_or(f64::NAN))
    }

    /// Row-major export with unpredictable cells as `None`
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        self.cells
            .rows()
            .into_iter()
            .map(|row| row.iter().map(Cell::value).collect())
            .collect()
    }

    /// Feed the completed matrix back in as ratings
    ///
    /// Observed and predicted cells are all marked rated, estimates of zero
    /// or below included; unpredictable cells go back to unrated.
    pub fn to_rating_matrix(&self) -> Result<RatingMatrix> {
        RatingMatrix::with_observed(
            self.cells.mapv(|cell| cell.value().unwrap_or(0.0)),
            self.cells.mapv(|cell| !cell.is_unpredictable()),
        )
    }

    pub fn observed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_observed()).count()
    }

    pub fn predicted_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Predicted(_)))
            .count()
    }

    pub fn unpredictable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_unpredictable()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PredictionMatrix {
        PredictionMatrix::from_rows(vec![
            vec![Cell::Observed(5.0), Cell::Predicted(2.5)],
            vec![Cell::Unpredictable, Cell::Observed(1.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_counts() {
        let m = sample();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.observed_count(), 2);
        assert_eq!(m.predicted_count(), 1);
        assert_eq!(m.unpredictable_count(), 1);
    }

    #[test]
    fn test_dense_export_marks_unpredictable_as_nan() {
        let dense = sample().to_dense();
        assert_eq!(dense[[0, 1]], 2.5);
        assert!(dense[[1, 0]].is_nan());
    }

    #[test]
    fn test_row_export() {
        let rows = sample().to_rows();
        assert_eq!(rows, vec![vec![Some(5.0), Some(2.5)], vec![None, Some(1.0)]]);
    }

    #[test]
    fn test_get_bounds() {
        let m = sample();
        assert_eq!(m.get(1, 1).unwrap(), Cell::Observed(1.0));
        assert!(m.get(2, 0).is_err());
        assert!(m.get(0, 2).is_err());
        assert!(m.row(5).is_err());
    }

    #[test]
    fn test_back_to_ratings() {
        let ratings = sample().to_rating_matrix().unwrap();
        assert_eq!(ratings.rating(0, 1).unwrap(), 2.5);
        assert!(!ratings.is_rated(1, 0).unwrap());
    }

    #[test]
    fn test_back_to_ratings_keeps_zero_and_negative_estimates() {
        let filled = PredictionMatrix::from_rows(vec![vec![
            Cell::Observed(3.0),
            Cell::Predicted(-0.5),
            Cell::Predicted(0.0),
            Cell::Unpredictable,
        ]])
        .unwrap();

        let ratings = filled.to_rating_matrix().unwrap();
        assert_eq!(ratings.rated_items(0).unwrap(), &[0, 1, 2]);
        assert_eq!(ratings.rating(0, 1).unwrap(), -0.5);
        assert!(ratings.is_rated(0, 2).unwrap());
        assert!(!ratings.is_rated(0, 3).unwrap());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let ragged = PredictionMatrix::from_rows(vec![
            vec![Cell::Unpredictable, Cell::Unpredictable],
            vec![Cell::Unpredictable],
        ]);
        assert!(matches!(ragged, Err(CfError::ShapeMismatch(_))));
    }
}

//! Persistence of the completed rating matrix
//!
//! The matrix is written as `<cache_dir>/rankings.json`. Unpredictable
//! cells are stored as `null`.

use crate::error::{CfError, Result};
use crate::models::PredictionMatrix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub const RANKINGS_FILE: &str = "rankings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingsFile {
    pub users: usize,
    pub items: usize,
    pub k: usize,
    pub generated_at: DateTime<Utc>,
    pub ratings: Vec<Vec<Option<f64>>>,
}

impl RankingsFile {
    pub fn new(predictions: &PredictionMatrix, k: usize) -> Self {
        let (users, items) = predictions.shape();
        Self {
            users,
            items,
            k,
            generated_at: Utc::now(),
            ratings: predictions.to_rows(),
        }
    }
}

/// Write the completed matrix, creating `cache_dir` if needed
pub async fn save_rankings(
    cache_dir: impl AsRef<Path>,
    predictions: &PredictionMatrix,
    k: usize,
) -> Result<PathBuf> {
    let dir = cache_dir.as_ref();
    fs::create_dir_all(dir).await?;

    let path = dir.join(RANKINGS_FILE);
    let payload = serde_json::to_vec(&RankingsFile::new(predictions, k))?;
    fs::write(&path, payload).await?;

    info!(path = %path.display(), "Rankings saved");
    Ok(path)
}

pub async fn load_rankings(path: impl AsRef<Path>) -> Result<RankingsFile> {
    let data = fs::read(path.as_ref()).await?;
    let file: RankingsFile = serde_json::from_slice(&data)?;

    if file.ratings.len() != file.users || file.ratings.iter().any(|r| r.len() != file.items) {
        return Err(CfError::ShapeMismatch(format!(
            "{} declares {}x{} but rows disagree",
            path.as_ref().display(),
            file.users,
            file.items
        )));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    #[tokio::test]
    async fn test_save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("cache");
        let predictions = PredictionMatrix::from_rows(vec![
            vec![Cell::Observed(4.0), Cell::Unpredictable],
            vec![Cell::Predicted(2.25), Cell::Observed(1.0)],
        ])
        .unwrap();

        let path = save_rankings(&dir, &predictions, 1).await.unwrap();
        assert_eq!(path, dir.join(RANKINGS_FILE));

        let loaded = load_rankings(&path).await.unwrap();
        assert_eq!(loaded.users, 2);
        assert_eq!(loaded.items, 2);
        assert_eq!(loaded.k, 1);
        assert_eq!(loaded.ratings[0], vec![Some(4.0), None]);
        assert_eq!(loaded.ratings[1], vec![Some(2.25), Some(1.0)]);
    }

    #[tokio::test]
    async fn test_load_rejects_inconsistent_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(RANKINGS_FILE);
        let body = r#"{"users":2,"items":1,"k":1,"generated_at":"2024-01-01T00:00:00Z","ratings":[[1.0]]}"#;
        tokio::fs::write(&path, body).await.unwrap();

        assert!(matches!(
            load_rankings(&path).await,
            Err(CfError::ShapeMismatch(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_rankings(tmp.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, CfError::Io(_)));
    }
}

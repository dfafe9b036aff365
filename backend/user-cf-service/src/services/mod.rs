// ============================================
// User-based Collaborative Filtering
// ============================================
//
// Data Flow:
//   RatingMatrix → SimilarityEngine (Pearson) → NeighborSelector (top-k)
//                                                    ↓
//                                  PredictionEngine → PredictionMatrix
//
// Every stage reads the immutable rating matrix; per-user rows are
// independent and computed in parallel.

pub mod neighbors;
pub mod prediction;
pub mod similarity;

pub use neighbors::NeighborSelector;
pub use prediction::{PredictionConfig, PredictionEngine, UnpredictablePolicy};
pub use similarity::{pearson, SimilarityEngine};

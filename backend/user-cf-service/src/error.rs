use thiserror::Error;

pub type Result<T> = std::result::Result<T, CfError>;

#[derive(Debug, Error)]
pub enum CfError {
    #[error("User {user} is out of bounds for matrix with {users} users")]
    UserOutOfBounds { user: usize, users: usize },

    #[error("Item {item} is out of bounds for matrix with {items} items")]
    ItemOutOfBounds { item: usize, items: usize },

    #[error("Neighborhood size k={k} must be in [1, {candidates}] (include_self={include_self})")]
    InvalidNeighborhoodSize {
        k: usize,
        candidates: usize,
        include_self: bool,
    },

    #[error("Invalid rating {value} at ({user}, {item}): ratings must be finite and non-negative")]
    InvalidRating { user: usize, item: usize, value: f64 },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CfError {
    fn from(err: serde_json::Error) -> Self {
        CfError::Serialization(err.to_string())
    }
}

impl From<envy::Error> for CfError {
    fn from(err: envy::Error) -> Self {
        CfError::Configuration(err.to_string())
    }
}

impl CfError {
    /// Configuration-class errors are raised before any computation starts
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CfError::InvalidNeighborhoodSize { .. } | CfError::Configuration(_)
        )
    }

    /// Bounds-class errors come from out-of-range user or item indices
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            CfError::UserOutOfBounds { .. } | CfError::ItemOutOfBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let err = CfError::InvalidNeighborhoodSize {
            k: 0,
            candidates: 3,
            include_self: true,
        };
        assert!(err.is_configuration());
        assert!(!err.is_out_of_bounds());

        let err = CfError::UserOutOfBounds { user: 5, users: 3 };
        assert!(err.is_out_of_bounds());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_messages() {
        let err = CfError::ItemOutOfBounds { item: 7, items: 4 };
        assert_eq!(
            err.to_string(),
            "Item 7 is out of bounds for matrix with 4 items"
        );
    }
}

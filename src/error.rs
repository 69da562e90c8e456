//! Error types for soft body construction and configuration.

use thiserror::Error;

/// Result type alias for fallible tetsim operations.
pub type TetSimResult<T> = Result<T, TetSimError>;

/// Errors raised while building a soft body or validating its parameters.
///
/// The simulation step itself never fails; degenerate numerics are no-ops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TetSimError {
    /// Physics parameters are outside their supported range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh buffers are malformed.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// An index refers past the end of the buffer it addresses.
    #[error("index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: usize, count: usize },
}

impl TetSimError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    /// Create an invalid mesh error.
    #[must_use]
    pub fn invalid_mesh(details: impl Into<String>) -> Self {
        Self::InvalidMesh(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TetSimError::invalid_config("num_substeps must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid configuration: num_substeps must be at least 1"
        );

        let err = TetSimError::IndexOutOfBounds { index: 9, count: 4 };
        assert_eq!(err.to_string(), "index 9 out of bounds (count: 4)");
    }
}

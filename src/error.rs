//! Error types for map generation.

use thiserror::Error;

/// Failure reported by a host engine operation.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The host does not implement the requested capability.
    #[error("host operation not supported: {0}")]
    Unsupported(&'static str),

    /// The host rejected or failed a call.
    #[error("host operation '{operation}' failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },
}

impl AdapterError {
    pub fn failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            operation,
            message: message.into(),
        }
    }
}

/// Errors raised by generation stages.
#[derive(Debug, Error)]
pub enum MapGenError {
    /// A required foundation tensor was never computed.
    #[error("required tensor '{0}' is missing")]
    MissingTensor(&'static str),

    /// A tensor does not cover the full map.
    #[error("tensor '{name}' has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A stage needs the foundation context but it was not built.
    #[error("foundation context has not been initialized")]
    MissingFoundation,

    /// Landmass generation produced no windows.
    #[error("landmass generation produced no windows")]
    NoLandmassWindows,

    /// A catalog name required by a stage is absent from the host catalog.
    #[error("{kind} '{name}' is not present in the host catalog")]
    MissingCatalogEntry { kind: &'static str, name: String },

    /// Map dimensions are unusable.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A host operation failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

pub type Result<T> = std::result::Result<T, MapGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_converts() {
        fn fails() -> Result<()> {
            Err(AdapterError::failed("create_fractal", "boom"))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(matches!(err, MapGenError::Adapter(_)));
        assert!(err.to_string().contains("create_fractal"));
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = MapGenError::LengthMismatch {
            name: "plateId",
            expected: 100,
            actual: 99,
        };
        assert_eq!(err.to_string(), "tensor 'plateId' has length 99, expected 100");
    }
}

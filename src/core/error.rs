use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchellingError {
    #[error("Grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Occupant counts sum to {actual}, expected {expected} cells")]
    CompositionMismatch { expected: usize, actual: usize },

    #[error("Composition must contain at least one agent group")]
    NoGroups,

    #[error("Too many agent groups: {0}")]
    TooManyGroups(usize),

    #[error("Tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f64),

    #[error("Layout holds {actual} cells, expected {expected}")]
    LayoutMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SchellingError {
    /// True for errors raised while validating a configuration
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            SchellingError::IoError(_) | SchellingError::TomlError(_) | SchellingError::SerdeError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SchellingError>;

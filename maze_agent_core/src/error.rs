//! Error types for setup operations.
//!
//! Per-tick decisions never fail; they degrade to a fallback move. Only
//! loading maps, validating configuration and writing exports return errors.
//! Validation reports [`ConfigError`] directly; file operations report the
//! crate [`Error`].

use thiserror::Error;

/// Errors raised while parsing a maze map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map string is empty")]
    Empty,

    #[error("map has zero width")]
    ZeroWidth,

    #[error("inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown map code '{code}' at position ({x}, {y})")]
    UnknownCode { code: String, x: usize, y: usize },

    #[error("multiple start positions ('ST') found")]
    MultipleStarts,

    #[error("no start position ('ST') found in map")]
    MissingStart,

    #[error("coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },

    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("reward ordering violated: {larger} ({larger_value}) must exceed {smaller} ({smaller_value})")]
    RewardOrdering {
        larger: &'static str,
        larger_value: f64,
        smaller: &'static str,
        smaller_value: f64,
    },
}

/// Main error type for the crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

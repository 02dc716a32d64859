//! Error types for clasplot

use thiserror::Error;

/// clasplot core error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error (bad binning, mismatched lengths, bad input values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A histogram name is not present in the mapping
    #[error("histogram not found: {0}")]
    KeyNotFound(String),

    /// The histogram exists but has the wrong dimensionality
    #[error("histogram '{name}' is {found}-D, expected {expected}-D")]
    WrongDimension {
        /// Histogram name.
        name: String,
        /// Requested dimension.
        expected: usize,
        /// Stored dimension.
        found: usize,
    },

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

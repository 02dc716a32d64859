//! Error types for ROOT file reading and writing.

use thiserror::Error;

/// Errors raised while reading or writing ROOT files.
#[derive(Error, Debug)]
pub enum RootError {
    /// The file does not start with the `root` magic (or is too small to).
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// Malformed or unexpected object data.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The object class has no reader.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),

    /// No key with this name (or path) exists.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A read ran past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes left.
        have: usize,
    },

    /// A compressed block could not be decoded.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The decoded object does not form a valid histogram.
    #[error(transparent)]
    Histogram(#[from] cp_core::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RootError>;

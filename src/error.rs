//! Error types for SmolDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SmolError
pub type Result<T> = std::result::Result<T, SmolError>;

/// Unified error type for SmolDB operations
#[derive(Debug, Error)]
pub enum SmolError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Key already exists: {0}")]
    DuplicateKey(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Invalid compression level {0} (expected 0-9)")]
    InvalidCompressionLevel(u32),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SmolError {
    /// Map an I/O error raised while reading a body into the right kind.
    ///
    /// A stream that ends early or that the decompressor rejects is a
    /// malformed file, not an I/O failure.
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof => SmolError::Decoding("unexpected end of file".to_string()),
            ErrorKind::InvalidData | ErrorKind::InvalidInput => {
                SmolError::Decoding(format!("corrupt stream: {}", err))
            }
            _ => SmolError::Io(err),
        }
    }
}

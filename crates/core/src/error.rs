//! Error types for the tokenizer core.

use thiserror::Error;

/// Main error type for the tokenizer library.
///
/// Encoding and decoding are total functions over validated tables; errors
/// can only arise while the immutable configuration is being built.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two vocabulary entries mapped to the same ID
    #[error("Duplicate token ID {id} (already assigned to {piece:?})")]
    DuplicateId { id: u32, piece: String },

    /// The same piece string appeared twice in the vocabulary
    #[error("Duplicate vocabulary piece {0:?}")]
    DuplicatePiece(String),
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;

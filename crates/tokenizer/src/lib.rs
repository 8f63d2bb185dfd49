//! Morsel-tokenizer - Subword tokenizer API
//!
//! This crate composes the BPE merge engine from `morsel-core` with the
//! surrounding text pipeline: whitespace sentinelization, user
//! substitutions, UTF-8 codepoint splitting, and greedy merging of an added
//! vocabulary, plus the ID mapping for encode and decode.
//!
//! # Example
//!
//! ```rust
//! use morsel_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::builder()
//!     .vocab([
//!         ("<unk>".to_string(), 0),
//!         ("\u{2581}".to_string(), 1),
//!         ("h".to_string(), 2),
//!         ("i".to_string(), 3),
//!         ("\u{2581}h".to_string(), 4),
//!         ("\u{2581}hi".to_string(), 5),
//!     ])
//!     .merges([
//!         (("\u{2581}".to_string(), "h".to_string()), 0),
//!         (("\u{2581}h".to_string(), "i".to_string()), 1),
//!     ])
//!     .build()?;
//!
//! assert_eq!(tokenizer.encode("hi"), vec![5]);
//! assert_eq!(tokenizer.decode(&[5]), " hi");
//! # Ok::<(), morsel_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use morsel_core::{
    Dropout, MergeEngine, MergeTable, Result, TokenizerError, Vocabulary, UNKNOWN_ID,
};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{EncodeOptions, Tokenizer, TokenizerBuilder};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{
    split_codepoint_bytes, split_codepoints, AddedVocabulary, Normalizer, DEFAULT_SENTINEL,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

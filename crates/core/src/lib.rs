//! Morsel-core - SentencePiece-style BPE merge engine
//!
//! This crate provides the data structures and the priority-queue merge
//! algorithm for subword encoding over a pretrained merge table and
//! vocabulary, independent of any text pipeline.
//!
//! # Features
//!
//! - Merge-rank table indexed by pair concatenation for single-lookup
//!   adjacency queries
//! - Vocabulary with eager reverse mapping and used/unused ID classification
//! - Lazy-invalidation merge agenda over an 8-ary heap
//! - BPE-dropout with optional seeding for reproducible segmentations
//! - Re-segmentation of merged pieces that fall outside the vocabulary
//!
//! # Example
//!
//! ```rust
//! use morsel_core::{MergeTable, Vocabulary};
//!
//! let table = MergeTable::from_pairs([(("a".to_string(), "b".to_string()), 0)]);
//! assert_eq!(table.rank("ab"), Some(0));
//!
//! let vocab = Vocabulary::from_entries([
//!     ("<unk>".to_string(), 0),
//!     ("a".to_string(), 1),
//!     ("b".to_string(), 2),
//!     ("ab".to_string(), 3),
//! ])?;
//! assert!(vocab.piece_is_used("ab"));
//! # Ok::<(), morsel_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Immutable tables and the merge agenda
pub mod core;
pub use core::{Candidate, MergeAgenda, MergeTable, Vocab, VocabR, Vocabulary, UNKNOWN_ID};

// The merge engine
pub mod encoding;
pub use encoding::{Dropout, MergeEngine};

//! Vocabulary storage and lookup.
//!
//! The vocabulary maps piece strings to IDs and back. The reverse map is
//! derived eagerly at construction and the size is cached: an ID is *used*
//! when it falls in `[0, len)`, anything else is *unused* and subject to
//! re-segmentation by the merge engine.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// ID emitted for pieces missing from the vocabulary.
///
/// Callers must reserve ID 0 for their unknown token.
pub const UNKNOWN_ID: u32 = 0;

/// Forward mapping: piece string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> piece string
pub type VocabR = AHashMap<u32, CompactString>;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Forward mapping: piece string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> piece string
    vocab_r: VocabR,
    /// Cached vocabulary size, the bound for used IDs
    size: usize,
}

impl Vocabulary {
    /// Build a vocabulary from `(piece, id)` entries.
    ///
    /// Returns an error if an ID or a piece appears twice; the reverse map
    /// must be a bijection on the ID side.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let entries = entries.into_iter();
        let mut vocab = Vocab::with_capacity(entries.size_hint().0);
        let mut vocab_r = VocabR::with_capacity(entries.size_hint().0);

        for (piece, id) in entries {
            let piece = CompactString::from(piece);
            if let Some(existing) = vocab_r.insert(id, piece.clone()) {
                return Err(TokenizerError::DuplicateId {
                    id,
                    piece: existing.into(),
                });
            }
            if vocab.insert(piece.clone(), id).is_some() {
                return Err(TokenizerError::DuplicatePiece(piece.into()));
            }
        }

        let size = vocab.len();
        Ok(Self {
            vocab,
            vocab_r,
            size,
        })
    }

    /// Get the ID for a piece string.
    #[inline]
    pub fn get_id(&self, piece: &str) -> Option<u32> {
        self.vocab.get(piece).copied()
    }

    /// Get the ID for a piece string, falling back to [`UNKNOWN_ID`].
    #[inline]
    pub fn id_or_unknown(&self, piece: &str) -> u32 {
        self.get_id(piece).unwrap_or(UNKNOWN_ID)
    }

    /// Get the piece string for an ID.
    #[inline]
    pub fn get_piece(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|piece| piece.as_str())
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check whether an ID is in the used range `[0, len)`.
    #[inline]
    pub fn id_is_used(&self, id: u32) -> bool {
        (id as usize) < self.size
    }

    /// Check whether a piece maps to a used ID.
    ///
    /// Pieces missing from the vocabulary, and pieces whose assigned ID falls
    /// outside `[0, len)`, are both classified unused.
    #[inline]
    pub fn piece_is_used(&self, piece: &str) -> bool {
        self.get_id(piece).map_or(false, |id| self.id_is_used(id))
    }
}

//! Main tokenizer implementation.
//!
//! This module provides the high-level [`Tokenizer`] that composes the
//! encoding pipeline — normalization, codepoint splitting, added-vocabulary
//! merging, BPE merging, ID mapping — and the reverse ID-to-text mapping.

use crate::pre_tokenizer::{split_codepoints, AddedVocabulary, Normalizer, DEFAULT_SENTINEL};
use ahash::AHashMap;
use compact_str::CompactString;
use morsel_core::{Dropout, MergeEngine, MergeTable, Result, Vocabulary};
use std::sync::Arc;

/// Per-call encoding options.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// BPE-dropout probability. `0.0` (the default) applies every merge;
    /// `1.0` applies none.
    pub dropout: f32,
    /// Fixed RNG seed for reproducible dropout. `None` (the default) seeds
    /// from platform entropy on each call.
    pub seed: Option<u64>,
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    merges: Vec<((String, String), u32)>,
    vocab: Vec<(String, u32)>,
    added_vocab: Vec<String>,
    sentinel: Option<String>,
    replacements: Vec<(String, String)>,
    reverse_replacements: Vec<(String, String)>,
}

impl TokenizerBuilder {
    /// Create a new builder with an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merge rules as `((left, right), rank)` pairs.
    pub fn merges<I>(mut self, merges: I) -> Self
    where
        I: IntoIterator<Item = ((String, String), u32)>,
    {
        self.merges = merges.into_iter().collect();
        self
    }

    /// Set the vocabulary as `(piece, id)` entries.
    pub fn vocab<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        self.vocab = entries.into_iter().collect();
        self
    }

    /// Set the literal strings merged greedily before BPE.
    pub fn added_vocab<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.added_vocab = entries.into_iter().collect();
        self
    }

    /// Set the whitespace sentinel. An empty string disables the leading
    /// boundary marker, the encode-side space substitution, and the
    /// decode-side reversal.
    pub fn whitespace_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    /// Set the forward substitution map applied during encoding.
    pub fn replacements<I>(mut self, replacements: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.replacements = replacements.into_iter().collect();
        self
    }

    /// Set the reverse substitution map applied per piece during decoding.
    pub fn reverse_replacements<I>(mut self, replacements: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.reverse_replacements = replacements.into_iter().collect();
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        let vocab = Arc::new(Vocabulary::from_entries(self.vocab)?);
        let merges = Arc::new(MergeTable::from_pairs(self.merges));
        let engine = MergeEngine::new(merges, Arc::clone(&vocab));

        let sentinel = self
            .sentinel
            .unwrap_or_else(|| DEFAULT_SENTINEL.to_string());
        let normalizer = Normalizer::new(sentinel.clone(), self.replacements);

        let reverse_replacements = self
            .reverse_replacements
            .into_iter()
            .map(|(original, replacement)| {
                (CompactString::from(original), CompactString::from(replacement))
            })
            .collect();

        Ok(Tokenizer {
            vocab,
            engine,
            normalizer,
            added_vocab: AddedVocabulary::new(self.added_vocab),
            sentinel,
            reverse_replacements,
        })
    }
}

/// Subword tokenizer over a pretrained merge table and vocabulary.
///
/// All configuration is immutable after construction; every encode and
/// decode surface takes `&self` and keeps its transient state call-local,
/// so one instance can serve unsynchronized concurrent calls.
pub struct Tokenizer {
    /// Vocabulary, shared with the engine
    vocab: Arc<Vocabulary>,
    /// BPE merge engine
    engine: MergeEngine,
    /// Whitespace sentinelization and forward substitutions
    normalizer: Normalizer,
    /// Literals merged greedily before BPE
    added_vocab: AddedVocabulary,
    /// Whitespace sentinel, reversed to a space during decoding
    sentinel: String,
    /// Whole-piece substitutions applied during decoding
    reverse_replacements: AHashMap<CompactString, CompactString>,
}

impl Tokenizer {
    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Encode text to token IDs with no dropout.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encode_with(text, &EncodeOptions::default())
    }

    /// Encode text to token IDs.
    ///
    /// Pieces missing from the vocabulary map to [`morsel_core::UNKNOWN_ID`].
    pub fn encode_with(&self, text: &str, options: &EncodeOptions) -> Vec<u32> {
        self.encode_pieces_with(text, options)
            .iter()
            .map(|piece| self.vocab.id_or_unknown(piece))
            .collect()
    }

    /// Encode text to subword pieces with no dropout.
    pub fn encode_pieces(&self, text: &str) -> Vec<CompactString> {
        self.encode_pieces_with(text, &EncodeOptions::default())
    }

    /// Encode text to subword pieces.
    pub fn encode_pieces_with(&self, text: &str, options: &EncodeOptions) -> Vec<CompactString> {
        let normalized = self.normalizer.normalize(text);
        let pieces: Vec<CompactString> = split_codepoints(&normalized)
            .into_iter()
            .map(CompactString::from)
            .collect();
        let pieces = self.added_vocab.merge(pieces);

        let mut dropout = match options.seed {
            Some(seed) => Dropout::with_seed(options.dropout, seed),
            None => Dropout::new(options.dropout),
        };
        self.engine.segment(pieces, &mut dropout)
    }

    /// Encode a batch of texts in parallel, with no dropout.
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Vec<u32>> {
        use rayon::prelude::*;

        texts.par_iter().map(|text| self.encode(text)).collect()
    }

    /// Decode token IDs back to text.
    ///
    /// IDs without a vocabulary entry and empty pieces are skipped silently.
    /// Each piece goes through the reverse substitution map on a whole-piece
    /// match, then every sentinel occurrence becomes one ASCII space.
    pub fn decode(&self, ids: &[u32]) -> String {
        let mut output = String::with_capacity(ids.len() * 8);

        for &id in ids {
            let piece = match self.vocab.get_piece(id) {
                Some(piece) if !piece.is_empty() => piece,
                _ => continue,
            };

            let piece = match self.reverse_replacements.get(piece) {
                Some(replacement) => replacement.as_str(),
                None => piece,
            };

            if self.sentinel.is_empty() {
                output.push_str(piece);
                continue;
            }

            let mut start = 0;
            while let Some(found) = piece[start..].find(&self.sentinel) {
                let pos = start + found;
                output.push_str(&piece[start..pos]);
                output.push(' ');
                start = pos + self.sentinel.len();
            }
            output.push_str(&piece[start..]);
        }

        output
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }
}

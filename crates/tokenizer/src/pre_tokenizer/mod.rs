//! Pre-tokenization pipeline.
//!
//! Everything that runs before the merge engine: whitespace sentinelization
//! and user substitutions, codepoint splitting, and greedy merging of the
//! added vocabulary.

pub mod added_vocab;
pub mod normalize;
pub mod split;

pub use added_vocab::AddedVocabulary;
pub use normalize::{Normalizer, DEFAULT_SENTINEL};
pub use split::{split_codepoint_bytes, split_codepoints};

//! Core BPE data structures.
//!
//! This module contains the immutable tables and the merge agenda used by
//! the merge engine, independent of the surrounding text pipeline.

pub mod agenda;
pub mod merges;
pub mod vocab;

pub use agenda::{Candidate, MergeAgenda};
pub use merges::MergeTable;
pub use vocab::{Vocab, VocabR, Vocabulary, UNKNOWN_ID};

//! Merge rule storage for BPE.
//!
//! Merge rules map an ordered pair of pieces to a rank (lower rank = earlier,
//! stronger merge). The table is indexed by the concatenation of the pair so
//! that checking whether two adjacent symbols can merge is a single lookup on
//! the merged string.

use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Immutable merge-rank table, keyed by `left ⊕ right`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeTable {
    /// Concatenated pair -> rank
    ranks: AHashMap<CompactString, u32>,
}

impl MergeTable {
    /// Create a new empty merge table.
    pub fn new() -> Self {
        Self {
            ranks: AHashMap::new(),
        }
    }

    /// Create a new merge table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ranks: AHashMap::with_capacity(capacity),
        }
    }

    /// Add a merge rule for the pair `(left, right)`.
    ///
    /// Pairs whose concatenations collide keep the last inserted rank.
    pub fn insert(&mut self, left: &str, right: &str, rank: u32) {
        let mut merged = CompactString::with_capacity(left.len() + right.len());
        merged.push_str(left);
        merged.push_str(right);
        self.ranks.insert(merged, rank);
    }

    /// Build a table from `((left, right), rank)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = ((String, String), u32)>,
    {
        let pairs = pairs.into_iter();
        let mut table = Self::with_capacity(pairs.size_hint().0);
        for ((left, right), rank) in pairs {
            table.insert(&left, &right, rank);
        }
        table
    }

    /// Get the rank of the pair whose concatenation is `merged`.
    ///
    /// Returns `None` if no rule produces that string.
    #[inline]
    pub fn rank(&self, merged: &str) -> Option<u32> {
        self.ranks.get(merged).copied()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_rank() {
        let mut table = MergeTable::new();
        table.insert("a", "b", 0);
        table.insert("ab", "c", 1);

        assert_eq!(table.rank("ab"), Some(0));
        assert_eq!(table.rank("abc"), Some(1));
        assert_eq!(table.rank("bc"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_from_pairs() {
        let table = MergeTable::from_pairs([
            (("he".to_string(), "llo".to_string()), 3),
            (("h".to_string(), "e".to_string()), 0),
        ]);

        assert_eq!(table.rank("he"), Some(0));
        assert_eq!(table.rank("hello"), Some(3));
    }

    #[test]
    fn test_colliding_concatenation_keeps_last() {
        let mut table = MergeTable::new();
        table.insert("a", "bc", 5);
        table.insert("ab", "c", 2);

        // Both pairs concatenate to "abc"; the later rule wins.
        assert_eq!(table.rank("abc"), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty() {
        let table = MergeTable::new();
        assert!(table.is_empty());
        assert_eq!(table.rank("ab"), None);
    }
}

//! Greedy merging of user-supplied literal vocabulary.
//!
//! Before BPE runs, every occurrence of each added-vocabulary literal is
//! collapsed from its constituent codepoints into a single piece. Entries are
//! processed longest first, so a longer literal always beats any shorter one
//! it contains; within one entry, occurrences are matched greedily
//! left-to-right and a matched span is never rescanned.

use crate::pre_tokenizer::split::split_codepoints;
use compact_str::CompactString;

/// One slot of the index-linked chain the merger walks. Spliced-out slots
/// keep their index with an emptied piece; links skip them.
struct Link {
    piece: CompactString,
    next: isize,
}

/// Literal strings merged into single pieces ahead of BPE.
#[derive(Debug, Clone, Default)]
pub struct AddedVocabulary {
    /// Codepoint-split entries, sorted descending by byte length
    entries: Vec<Vec<CompactString>>,
}

impl AddedVocabulary {
    /// Create an added vocabulary from literal strings.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut sorted: Vec<String> = entries.into_iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));

        let entries = sorted
            .iter()
            .map(|entry| {
                split_codepoints(entry)
                    .into_iter()
                    .map(CompactString::from)
                    .collect()
            })
            .collect();

        Self { entries }
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse every occurrence of each entry's codepoint sequence into a
    /// single piece.
    pub fn merge(&self, pieces: Vec<CompactString>) -> Vec<CompactString> {
        if self.entries.is_empty() || pieces.is_empty() {
            return pieces;
        }

        let count = pieces.len();
        let mut links: Vec<Link> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| Link {
                piece,
                next: if i + 1 == count { -1 } else { (i + 1) as isize },
            })
            .collect();

        for entry in &self.entries {
            // A single codepoint is already one piece.
            if entry.len() < 2 {
                continue;
            }

            let mut current = 0isize;
            while current != -1 {
                let mut probe = current;
                let mut matched = 0;
                while probe != -1
                    && matched < entry.len()
                    && links[probe as usize].piece == entry[matched]
                {
                    probe = links[probe as usize].next;
                    matched += 1;
                }

                if matched == entry.len() {
                    // Splice the run into the leading slot and resume at the
                    // first piece after the match.
                    let mut merged = CompactString::default();
                    for piece in entry {
                        merged.push_str(piece);
                    }

                    let mut cursor = links[current as usize].next;
                    while cursor != probe {
                        let next = links[cursor as usize].next;
                        links[cursor as usize].piece = CompactString::default();
                        cursor = next;
                    }

                    links[current as usize].piece = merged;
                    links[current as usize].next = probe;
                    current = probe;
                } else {
                    current = links[current as usize].next;
                }
            }
        }

        links
            .into_iter()
            .map(|link| link.piece)
            .filter(|piece| !piece.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces(parts: &[&str]) -> Vec<CompactString> {
        parts.iter().map(|part| CompactString::from(*part)).collect()
    }

    fn strs(parts: &[CompactString]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn test_merges_occurrence() {
        let vocab = AddedVocabulary::new(["hello".to_string()]);
        let result = vocab.merge(pieces(&["s", "a", "y", "h", "e", "l", "l", "o", "!"]));
        assert_eq!(strs(&result), vec!["s", "a", "y", "hello", "!"]);
    }

    #[test]
    fn test_longest_entry_wins() {
        let vocab = AddedVocabulary::new(["ab".to_string(), "abc".to_string()]);
        let result = vocab.merge(pieces(&["a", "b", "c", "a", "b"]));
        // "abc" is processed first and consumes the prefix; "ab" still
        // matches the tail.
        assert_eq!(strs(&result), vec!["abc", "ab"]);
    }

    #[test]
    fn test_adjacent_occurrences() {
        let vocab = AddedVocabulary::new(["ab".to_string()]);
        let result = vocab.merge(pieces(&["a", "b", "a", "b"]));
        assert_eq!(strs(&result), vec!["ab", "ab"]);
    }

    #[test]
    fn test_matched_spans_are_not_rescanned() {
        let vocab = AddedVocabulary::new(["aba".to_string()]);
        let result = vocab.merge(pieces(&["a", "b", "a", "b", "a"]));
        // The first match consumes positions 0..3; scanning resumes after it,
        // so the overlapping occurrence at position 2 never matches.
        assert_eq!(strs(&result), vec!["aba", "b", "a"]);
    }

    #[test]
    fn test_single_codepoint_entry_is_skipped() {
        let vocab = AddedVocabulary::new(["a".to_string()]);
        let input = pieces(&["a", "b", "a"]);
        assert_eq!(strs(&vocab.merge(input.clone())), strs(&input));
    }

    #[test]
    fn test_multibyte_entry() {
        let vocab = AddedVocabulary::new(["\u{2581}caf\u{e9}".to_string()]);
        let result = vocab.merge(pieces(&["\u{2581}", "c", "a", "f", "\u{e9}", "s"]));
        assert_eq!(strs(&result), vec!["\u{2581}caf\u{e9}", "s"]);
    }

    #[test]
    fn test_merged_pieces_do_not_match_codepoints() {
        // After "ab" collapses, the merged piece is atomic: "abc" can no
        // longer assemble from it.
        let vocab = AddedVocabulary::new(["abc".to_string()]);
        let result = vocab.merge(pieces(&["ab", "c"]));
        assert_eq!(strs(&result), vec!["ab", "c"]);
    }

    #[test]
    fn test_empty_vocabulary_is_identity() {
        let vocab = AddedVocabulary::default();
        let input = pieces(&["a", "b"]);
        assert_eq!(strs(&vocab.merge(input.clone())), strs(&input));
    }
}

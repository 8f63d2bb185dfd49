//! Text normalization for pre-tokenization.
//!
//! Two transforms run before splitting: non-empty text gets one sentinel
//! prepended and every ASCII space replaced by the sentinel, so the first
//! word carries the same boundary marker as every space-preceded word; then
//! the forward substitution map is applied to the whole text. Substitutions
//! run longest original first, so a shorter key cannot shadow a longer one;
//! within one key, occurrences are replaced left-to-right without rescanning
//! the replacement.

/// Default whitespace sentinel, U+2581 "lower one-eighth block".
pub const DEFAULT_SENTINEL: &str = "\u{2581}";

/// Whitespace sentinelization plus user substitutions.
pub struct Normalizer {
    /// Replacement for ASCII space; empty disables sentinelization
    sentinel: String,
    /// Forward substitutions, sorted longest original first
    replacements: Vec<(String, String)>,
}

impl Normalizer {
    /// Create a normalizer.
    pub fn new<I>(sentinel: impl Into<String>, replacements: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut replacements: Vec<(String, String)> = replacements.into_iter().collect();
        replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            sentinel: sentinel.into(),
            replacements,
        }
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len() * 2);

        if self.sentinel.is_empty() {
            output.push_str(text);
        } else if !text.is_empty() {
            // The first word carries the same boundary marker as every
            // space-preceded word.
            output.push_str(&self.sentinel);
            for ch in text.chars() {
                if ch == ' ' {
                    output.push_str(&self.sentinel);
                } else {
                    output.push(ch);
                }
            }
        }

        for (original, replacement) in &self.replacements {
            if output.contains(original.as_str()) {
                output = output.replace(original.as_str(), replacement);
            }
        }

        output
    }

    /// The configured whitespace sentinel.
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL, [])
    }
}

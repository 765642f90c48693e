//! English stopword list.

use ahash::AHashSet;
use lazy_static::lazy_static;

lazy_static! {
    /// Common English words excluded from the index.
    pub static ref STOP_WORDS: AHashSet<&'static str> = {
        [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for",
            "if", "in", "into", "is", "it", "no", "not", "of", "on", "or",
            "such", "that", "the", "their", "then", "there", "these", "they",
            "this", "to", "was", "were", "will", "with",
        ]
        .into_iter()
        .collect()
    };
}

/// Whether `term` is a stopword. The check is case-sensitive; callers pass
/// lowercase terms.
pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(term)
}

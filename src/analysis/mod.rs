//! Text analysis: tokenization and stopword filtering.
//!
//! The indexing core treats tokenization as an opaque, deterministic
//! capability; everything here exists to produce token sequences for it.
//! Lowercase normalization happens downstream in the segment builder
//! regardless of what a tokenizer emits.

pub mod analyzer;
pub mod stopwords;
pub mod tokenizer;

pub use analyzer::EnglishAnalyzer;
pub use tokenizer::{RegexTokenizer, Tokenizer, WhitespaceTokenizer};

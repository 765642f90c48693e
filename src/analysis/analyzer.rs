//! English text analyzer: tokenize, lowercase, drop stopwords.

use crate::analysis::stopwords::is_stop_word;
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::error::Result;

/// The default analysis pipeline for English text.
///
/// Splits on word characters, lowercases, and removes stopwords. The segment
/// builder lowercases again downstream; that is intentional, since it cannot
/// assume anything about the tokenizer it is handed.
#[derive(Clone, Debug)]
pub struct EnglishAnalyzer {
    tokenizer: RegexTokenizer,
}

impl EnglishAnalyzer {
    /// Create a new English analyzer.
    pub fn new() -> Result<Self> {
        Ok(EnglishAnalyzer {
            tokenizer: RegexTokenizer::new()?,
        })
    }
}

impl Default for EnglishAnalyzer {
    fn default() -> Self {
        Self::new().expect("Default analyzer construction should not fail")
    }
}

impl Tokenizer for EnglishAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.tokenize(text)?;

        Ok(tokens
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !is_stop_word(t))
            .collect())
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_lowercases_and_filters() {
        let analyzer = EnglishAnalyzer::new().unwrap();
        let tokens = analyzer
            .tokenize("The Quick Brown Fox and the Lazy Dog")
            .unwrap();

        assert_eq!(tokens, vec!["quick", "brown", "fox", "lazy", "dog"]);
    }

    #[test]
    fn test_analyzer_is_deterministic() {
        let analyzer = EnglishAnalyzer::new().unwrap();
        let first = analyzer.tokenize("red blue red").unwrap();
        let second = analyzer.tokenize("red blue red").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, vec!["red", "blue", "red"]);
    }
}

//! Fixed-list lexicon scanner.
//!
//! Substring-matches a negative and a positive word list against the
//! lower-cased input. Negative is checked first; the first list with a hit
//! wins and maps to a fixed ±0.6 score.

use helpdesk_core::types::{Sentiment, SentimentLabel};

use crate::SentimentAnalyzer;

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "angry",
    "frustrated",
    "unacceptable",
];

const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "thank", "perfect"];

/// Score assigned on any list hit, signed per label.
const HIT_SCORE: f64 = 0.6;

/// Keyword-list sentiment classifier.
#[derive(Debug, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();

        if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
            return Sentiment {
                score: -HIT_SCORE,
                label: SentimentLabel::Negative,
            };
        }
        if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
            return Sentiment {
                score: HIT_SCORE,
                label: SentimentLabel::Positive,
            };
        }
        Sentiment::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Sentiment {
        LexiconAnalyzer::new().analyze(text)
    }

    #[test]
    fn test_negative_hit() {
        let s = analyze("this is terrible");
        assert_eq!(s.score, -0.6);
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_positive_hit() {
        let s = analyze("thank you so much");
        assert_eq!(s.score, 0.6);
        assert_eq!(s.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_neutral_default() {
        let s = analyze("what time is it");
        assert_eq!(s.score, 0.0);
        assert_eq!(s.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_negative_wins_over_positive() {
        // Both lists match; negative is checked first.
        let s = analyze("thank you but this is awful");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert_eq!(s.score, -0.6);
    }

    #[test]
    fn test_case_insensitive() {
        let s = analyze("ANGRY about my order");
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_substring_match() {
        // "thank" matches inside "thanks".
        let s = analyze("thanks a lot");
        assert_eq!(s.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let s = analyze("");
        assert_eq!(s.score, 0.0);
        assert_eq!(s.label, SentimentLabel::Neutral);
    }
}

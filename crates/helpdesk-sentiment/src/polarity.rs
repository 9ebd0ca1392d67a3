//! Continuous polarity scorer.
//!
//! Averages per-word valences over the tokens of the input to produce a
//! polarity in [-1, 1], then maps it onto the three-bucket contract:
//! polarity > 0.2 is positive, < -0.2 is negative, anything else neutral.
//! Confidence is |polarity| rounded to two decimals; the final score is the
//! confidence signed per label, 0.0 for neutral.

use helpdesk_core::types::{Sentiment, SentimentLabel};

use crate::SentimentAnalyzer;

/// Label threshold on the polarity axis.
const POLARITY_THRESHOLD: f64 = 0.2;

/// Word valences in [-1, 1]. Unlisted words contribute nothing.
const VALENCES: &[(&str, f64)] = &[
    // Positive.
    ("love", 0.5),
    ("great", 0.8),
    ("excellent", 0.9),
    ("good", 0.7),
    ("amazing", 0.8),
    ("wonderful", 0.8),
    ("happy", 0.6),
    ("helpful", 0.5),
    ("fast", 0.3),
    ("perfect", 0.9),
    ("thank", 0.4),
    ("thanks", 0.4),
    ("appreciate", 0.5),
    ("resolved", 0.4),
    ("works", 0.4),
    // Negative.
    ("hate", -0.8),
    ("terrible", -0.8),
    ("awful", -0.9),
    ("horrible", -0.9),
    ("bad", -0.7),
    ("worst", -0.9),
    ("broken", -0.5),
    ("slow", -0.3),
    ("angry", -0.7),
    ("frustrated", -0.6),
    ("frustrating", -0.6),
    ("useless", -0.7),
    ("disappointed", -0.6),
    ("unacceptable", -0.8),
    ("late", -0.3),
    ("wrong", -0.4),
    ("ridiculous", -0.6),
    ("refund", -0.2),
];

/// Valence-table polarity classifier.
#[derive(Debug, Default)]
pub struct PolarityAnalyzer;

impl PolarityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Raw polarity of the text in [-1, 1]: the mean valence of all matched
    /// tokens, 0.0 when nothing matches.
    pub fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut sum = 0.0;
        let mut matched = 0u32;

        for token in lower.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            if let Some((_, valence)) = VALENCES.iter().find(|(w, _)| *w == token) {
                sum += valence;
                matched += 1;
            }
        }

        if matched == 0 {
            0.0
        } else {
            (sum / matched as f64).clamp(-1.0, 1.0)
        }
    }
}

impl SentimentAnalyzer for PolarityAnalyzer {
    fn analyze(&self, text: &str) -> Sentiment {
        let polarity = self.polarity(text);
        let confidence = (polarity.abs() * 100.0).round() / 100.0;

        if polarity > POLARITY_THRESHOLD {
            Sentiment {
                score: confidence,
                label: SentimentLabel::Positive,
            }
        } else if polarity < -POLARITY_THRESHOLD {
            Sentiment {
                score: -confidence,
                label: SentimentLabel::Negative,
            }
        } else {
            Sentiment::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Sentiment {
        PolarityAnalyzer::new().analyze(text)
    }

    #[test]
    fn test_clearly_positive() {
        let s = analyze("this is great");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert_eq!(s.score, 0.8);
    }

    #[test]
    fn test_clearly_negative() {
        let s = analyze("this is terrible");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert_eq!(s.score, -0.8);
    }

    #[test]
    fn test_no_matches_is_neutral() {
        let s = analyze("what time is it");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let s = analyze("");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_mixed_valences_average() {
        // great (0.8) + slow (-0.3) -> polarity 0.25 -> positive.
        let s = analyze("great service but slow shipping");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert_eq!(s.score, 0.25);
    }

    #[test]
    fn test_weak_polarity_is_neutral() {
        // love (0.5) + hate (-0.8) -> polarity -0.15, inside the dead zone.
        let s = analyze("i love it and i hate it");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_confidence_rounded_two_decimals() {
        // love (0.5) + great (0.8) + excellent (0.9) -> 2.2/3 = 0.7333...
        let s = analyze("love it, great and excellent");
        assert_eq!(s.score, 0.73);
    }

    #[test]
    fn test_threshold_boundary_is_neutral() {
        // refund (-0.2) alone: -0.2 is not < -0.2.
        let s = analyze("refund");
        assert_eq!(s.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_tokenization_strips_punctuation() {
        let s = analyze("Terrible!!! Absolutely terrible.");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert_eq!(s.score, -0.8);
    }

    #[test]
    fn test_score_sign_matches_label() {
        for text in ["wonderful support", "awful experience", "hello there"] {
            let s = analyze(text);
            match s.label {
                SentimentLabel::Positive => assert!(s.score > 0.0),
                SentimentLabel::Negative => assert!(s.score < 0.0),
                SentimentLabel::Neutral => assert_eq!(s.score, 0.0),
            }
        }
    }
}

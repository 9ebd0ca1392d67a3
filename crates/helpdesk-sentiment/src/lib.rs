//! Helpdesk sentiment crate - text classification into three buckets.
//!
//! Two interchangeable strategies behind one trait: a fixed-list lexicon
//! scanner and a continuous polarity scorer. Both honor the same contract:
//! score in [-1, 1] agreeing in sign with the label, never failing, with
//! empty or unclassifiable text defaulting to neutral 0.0.

pub mod lexicon;
pub mod polarity;

use helpdesk_core::types::Sentiment;

pub use lexicon::LexiconAnalyzer;
pub use polarity::PolarityAnalyzer;

/// Strategy interface for sentiment classification.
pub trait SentimentAnalyzer: Send + Sync {
    /// Classify a piece of text. Infallible by contract.
    fn analyze(&self, text: &str) -> Sentiment;
}

/// Build an analyzer from a config engine name. Unknown names fall back to
/// the lexicon scanner.
pub fn analyzer_for(engine: &str) -> Box<dyn SentimentAnalyzer> {
    match engine {
        "polarity" => Box::new(PolarityAnalyzer::new()),
        "lexicon" => Box::new(LexiconAnalyzer::new()),
        other => {
            tracing::warn!(engine = %other, "Unknown sentiment engine, using lexicon");
            Box::new(LexiconAnalyzer::new())
        }
    }
}

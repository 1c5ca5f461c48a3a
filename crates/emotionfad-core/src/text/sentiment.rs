//! Sentiment polarity and subjectivity

use super::lexicon;
use serde::{Deserialize, Serialize};

/// Polarity in [-1, 1] and subjectivity in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl Sentiment {
    /// Construct with both values clamped to their ranges
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        let clean = |v: f64, lo: f64, hi: f64| if v.is_nan() { 0.0 } else { v.clamp(lo, hi) };
        Self {
            polarity: clean(polarity, -1.0, 1.0),
            subjectivity: clean(subjectivity, 0.0, 1.0),
        }
    }
}

/// Sentiment model seam
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Sentiment;
}

/// Lexicon-based analyzer.
///
/// Every rated word yields one assessment. A preceding intensifier scales
/// both values; a preceding negation multiplies polarity by -0.5. Negation
/// and intensity do not carry across sentence punctuation. The result is the
/// mean over all assessments, or neutral when no word is rated.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

/// Polarity factor applied after a negation word
const NEGATION_FACTOR: f64 = -0.5;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    fn assess(text: &str) -> Vec<(f64, f64)> {
        let lowered = text.to_lowercase();
        let mut assessments = Vec::new();

        for sentence in lowered.split(['.', '!', '?', ';', '\n']) {
            let mut negated = false;
            let mut multiplier: Option<f64> = None;

            for token in sentence
                .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
                .map(|t| t.trim_matches(|c: char| c == '\'' || c == '’'))
                .filter(|t| !t.is_empty())
            {
                if lexicon::is_negation(token) {
                    negated = true;
                    continue;
                }
                if let Some(factor) = lexicon::intensity(token) {
                    multiplier = Some(multiplier.unwrap_or(1.0) * factor);
                    continue;
                }
                if let Some((mut polarity, mut subjectivity)) = lexicon::rating(token) {
                    if let Some(factor) = multiplier.take() {
                        polarity *= factor;
                        subjectivity *= factor;
                    }
                    if negated {
                        polarity *= NEGATION_FACTOR;
                        negated = false;
                    }
                    assessments.push((polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)));
                } else {
                    // An unrated word breaks an intensifier chain but not a negation
                    multiplier = None;
                }
            }
        }

        assessments
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> Sentiment {
        let assessments = Self::assess(text);
        if assessments.is_empty() {
            return Sentiment::default();
        }

        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / n;
        Sentiment::new(polarity, subjectivity)
    }
}

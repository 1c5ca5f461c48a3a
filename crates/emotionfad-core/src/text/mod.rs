//! # Text Fraud Scanning
//!
//! Chat text is scanned three ways: a fixed fraud keyword list, a handful
//! of named suspicious regex patterns, and sentiment polarity/subjectivity.
//! The signals are combined by [`crate::scoring::fraud_risk`].

pub mod keywords;
pub mod lexicon;
pub mod patterns;
pub mod sentiment;

pub use sentiment::{LexiconSentiment, Sentiment, SentimentAnalyzer};

use crate::scoring::fraud_risk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Polarity above which text counts as positive
pub const POSITIVE_POLARITY: f64 = 0.3;

/// Polarity below which text counts as negative
pub const NEGATIVE_POLARITY: f64 = -0.3;

/// Coarse sentiment bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Positive,
    Neutral,
    Negative,
}

impl SentimentCategory {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_POLARITY {
            Self::Positive
        } else if polarity < NEGATIVE_POLARITY {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraud scan of one piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub text: String,
    pub sentiment_polarity: f64,
    pub sentiment_subjectivity: f64,
    pub sentiment_category: SentimentCategory,
    #[serde(default)]
    pub fraud_keywords_found: Vec<String>,
    #[serde(default)]
    pub suspicious_patterns_count: usize,
    #[serde(default)]
    pub suspicious_patterns_found: Vec<String>,
    pub fraud_risk_score: f64,
    #[serde(default)]
    pub is_suspicious: bool,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TextAnalysis {
    /// Scan `text` given its sentiment.
    ///
    /// `is_suspicious` is set when the fraud risk is strictly above
    /// `fraud_threshold`.
    pub fn scan(text: &str, sentiment: Sentiment, fraud_threshold: f64) -> Self {
        let lowered = text.to_lowercase();
        let keywords = keywords::find_keywords(&lowered);
        let patterns = patterns::find_patterns(text);

        let risk = fraud_risk(
            sentiment.polarity,
            keywords.len(),
            patterns.len(),
            sentiment.subjectivity,
        );

        Self {
            text: text.to_string(),
            sentiment_polarity: sentiment.polarity,
            sentiment_subjectivity: sentiment.subjectivity,
            sentiment_category: SentimentCategory::from_polarity(sentiment.polarity),
            fraud_keywords_found: keywords.into_iter().map(String::from).collect(),
            suspicious_patterns_count: patterns.len(),
            suspicious_patterns_found: patterns.into_iter().map(String::from).collect(),
            fraud_risk_score: risk,
            is_suspicious: risk > fraud_threshold,
            timestamp: Utc::now(),
        }
    }
}

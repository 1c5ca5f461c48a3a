//! # Comprehensive Report
//!
//! Combines an optional facial analysis and an optional text analysis into a
//! single risk score with a level, contributing factors and a recommendation.
//! Each source contributes at most half of the overall score.

use crate::scoring::FacialAnalysis;
use crate::text::TextAnalysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const HIGH_RISK_ABOVE: f64 = 0.7;
const MEDIUM_RISK_ABOVE: f64 = 0.4;

const HIGH_DECEPTION_ABOVE: f64 = 0.6;
const HIGH_STRESS_ABOVE: f64 = 0.7;
const POOR_MENTAL_HEALTH_BELOW: f64 = 40.0;
const HIGHLY_NEGATIVE_BELOW: f64 = -0.5;

/// Keywords listed in the keyword risk factor
const KEYWORDS_IN_FACTOR: usize = 3;

/// Overall fraud risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Strict thresholds: above 0.7 is high, above 0.4 is medium
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_RISK_ABOVE {
            Self::High
        } else if score > MEDIUM_RISK_ABOVE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::High => "🚨 ALERT: High fraud risk detected. Immediate investigation recommended.",
            Self::Medium => "⚠️ WARNING: Moderate fraud risk. Monitor closely and verify information.",
            Self::Low => "✅ Low fraud risk. Continue normal interaction.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined fraud risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendation: String,
    #[serde(default)]
    pub facial_analysis: Option<FacialAnalysis>,
    #[serde(default)]
    pub text_analysis: Option<TextAnalysis>,
    pub timestamp: DateTime<Utc>,
}

impl ComprehensiveReport {
    pub fn generate(facial: Option<&FacialAnalysis>, text: Option<&TextAnalysis>) -> Self {
        let mut score = 0.0;
        let mut factors = Vec::new();

        if let Some(facial) = facial {
            score += facial_contribution(facial);
            if facial.deception_risk > HIGH_DECEPTION_ABOVE {
                factors.push("High deception indicators in facial expression".to_string());
            }
            if facial.stress_level > HIGH_STRESS_ABOVE {
                factors.push("Elevated stress levels detected".to_string());
            }
            if facial.mental_health_score < POOR_MENTAL_HEALTH_BELOW {
                factors.push("Poor mental health indicators".to_string());
            }
        }

        if let Some(text) = text {
            score += text_contribution(text);
            if !text.fraud_keywords_found.is_empty() {
                let listed: Vec<&str> = text
                    .fraud_keywords_found
                    .iter()
                    .take(KEYWORDS_IN_FACTOR)
                    .map(String::as_str)
                    .collect();
                factors.push(format!(
                    "Fraud-related keywords detected: {}",
                    listed.join(", ")
                ));
            }
            if text.suspicious_patterns_count > 0 {
                factors.push("Suspicious communication patterns detected".to_string());
            }
            if text.sentiment_polarity < HIGHLY_NEGATIVE_BELOW {
                factors.push("Highly negative sentiment detected".to_string());
            }
        }

        let overall_risk_score = f64::clamp(score, 0.0, 1.0);
        let risk_level = RiskLevel::from_score(overall_risk_score);

        Self {
            overall_risk_score,
            risk_level,
            risk_factors: factors,
            recommendation: risk_level.recommendation().to_string(),
            facial_analysis: facial.cloned(),
            text_analysis: text.cloned(),
            timestamp: Utc::now(),
        }
    }
}

/// Half-weighted blend of deception and stress
fn facial_contribution(facial: &FacialAnalysis) -> f64 {
    (facial.deception_risk * 0.4 + facial.stress_level * 0.3) * 0.5
}

fn text_contribution(text: &TextAnalysis) -> f64 {
    text.fraud_risk_score * 0.5
}

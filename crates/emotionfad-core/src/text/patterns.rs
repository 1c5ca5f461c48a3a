//! Suspicious phrase patterns

use once_cell::sync::Lazy;
use regex::Regex;

/// A named regular expression describing a suspicious phrasing
#[derive(Debug)]
pub struct SuspiciousPattern {
    pub name: &'static str,
    pub regex: Regex,
}

const PATTERN_SOURCES: [(&str, &str); 6] = [
    (
        "payment_request",
        r"\b(give|send|transfer)\s+(me|us)\s+(money|cash|bitcoin|crypto)",
    ),
    (
        "account_details",
        r"\b(bank|credit\s+card|account)\s+(details|number|info)",
    ),
    (
        "urgent_payment",
        r"\b(urgent|emergency|immediately|right\s+now)\b.*\b(money|payment)",
    ),
    (
        "secrecy",
        r"\b(secret|don['’]t\s+tell|keep\s+quiet|confidential)\b",
    ),
    (
        "guaranteed_returns",
        r"\b(guaranteed|100%|risk-free)\s+(profit|return|money)",
    ),
    (
        "pressure_tactics",
        r"\b(act\s+now|limited\s+time|expires\s+soon)\b",
    ),
];

/// Compiled suspicious patterns, in declaration order
pub static SUSPICIOUS_PATTERNS: Lazy<Vec<SuspiciousPattern>> = Lazy::new(|| {
    PATTERN_SOURCES
        .iter()
        .map(|&(name, source)| SuspiciousPattern {
            name,
            regex: Regex::new(&format!("(?i){source}"))
                .expect("suspicious pattern must compile"),
        })
        .collect()
});

/// Names of the patterns matching `text`
pub fn find_patterns(text: &str) -> Vec<&'static str> {
    SUSPICIOUS_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(text))
        .map(|p| p.name)
        .collect()
}

//! Fraud keyword list

/// Words and phrases associated with fraud, matched as lowercase substrings
pub const FRAUD_KEYWORDS: [&str; 30] = [
    "steal",
    "hack",
    "fraud",
    "scam",
    "cheat",
    "lie",
    "deceive",
    "manipulate",
    "fake",
    "forge",
    "embezzle",
    "launder",
    "bribe",
    "extort",
    "blackmail",
    "phishing",
    "identity theft",
    "credit card",
    "bank account",
    "password",
    "social security",
    "illegal",
    "crime",
    "criminal",
    "money transfer",
    "wire transfer",
    "western union",
    "gift card",
    "bitcoin",
    "cryptocurrency",
];

/// Keywords contained in `lowered`, in list order.
///
/// Matching is plain substring search, so "cheated" counts for "cheat" and
/// "lie" also matches inside "client".
pub fn find_keywords(lowered: &str) -> Vec<&'static str> {
    FRAUD_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| lowered.contains(kw))
        .collect()
}

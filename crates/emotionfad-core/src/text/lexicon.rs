//! Embedded English sentiment lexicon.
//!
//! Each entry is `(word, polarity, subjectivity)` with polarity in [-1, 1]
//! and subjectivity in [0, 1]. Values follow the adjective/adverb ratings of
//! the pattern lexicon, extended with verbs and nouns common in chat.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const ENTRIES: &[(&str, f64, f64)] = &[
    // positive
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("wonderful", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("perfect", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("fine", 0.417, 0.5),
    ("happy", 0.8, 1.0),
    ("glad", 0.5, 1.0),
    ("love", 0.5, 0.6),
    ("lovely", 0.5, 0.75),
    ("like", 0.2, 0.3),
    ("enjoy", 0.4, 0.5),
    ("beautiful", 0.85, 1.0),
    ("pleasant", 0.733, 0.967),
    ("helpful", 0.5, 0.5),
    ("kind", 0.6, 0.9),
    ("friendly", 0.375, 0.5),
    ("thanks", 0.2, 0.2),
    ("thank", 0.2, 0.2),
    ("grateful", 0.6, 0.8),
    ("trust", 0.3, 0.4),
    ("honest", 0.6, 0.9),
    ("safe", 0.5, 0.5),
    ("secure", 0.4, 0.6),
    ("easy", 0.433, 0.833),
    ("free", 0.4, 0.8),
    ("lucky", 0.333, 1.0),
    ("rich", 0.375, 0.625),
    ("sure", 0.5, 0.889),
    ("right", 0.286, 0.536),
    ("calm", 0.3, 0.75),
    ("exciting", 0.3, 0.8),
    ("excited", 0.375, 0.75),
    ("interesting", 0.5, 0.5),
    ("impressive", 1.0, 1.0),
    ("brilliant", 0.9, 1.0),
    ("smart", 0.214, 0.643),
    ("fair", 0.7, 0.9),
    ("profitable", 0.5, 0.6),
    ("success", 0.3, 0.3),
    ("successful", 0.75, 0.95),
    ("win", 0.8, 0.4),
    ("winner", 0.5, 0.5),
    ("incredible", 0.9, 0.9),
    ("exclusive", 0.3, 0.6),
    ("special", 0.357, 0.571),
    ("important", 0.4, 1.0),
    ("reliable", 0.5, 0.6),
    ("comfortable", 0.4, 0.7),
    ("pleased", 0.5, 0.9),
    ("satisfied", 0.5, 1.0),
    ("welcome", 0.8, 0.9),
    ("cool", 0.35, 0.65),
    ("fun", 0.3, 0.2),
    ("positive", 0.227, 0.545),
    // negative
    ("bad", -0.7, 0.667),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("unhappy", -0.6, 0.9),
    ("angry", -0.5, 1.0),
    ("mad", -0.625, 1.0),
    ("upset", -0.5, 0.8),
    ("hate", -0.8, 0.9),
    ("hateful", -0.8, 0.9),
    ("stupid", -0.8, 1.0),
    ("dumb", -0.375, 0.5),
    ("ugly", -0.7, 1.0),
    ("evil", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
    ("fake", -0.5, 1.0),
    ("false", -0.4, 0.65),
    ("illegal", -0.5, 0.5),
    ("criminal", -0.4, 0.6),
    ("dishonest", -0.6, 0.9),
    ("suspicious", -0.3, 0.7),
    ("dangerous", -0.6, 0.9),
    ("scary", -0.5, 1.0),
    ("afraid", -0.6, 0.9),
    ("scared", -0.5, 0.9),
    ("worried", -0.4, 0.8),
    ("nervous", -0.3, 0.8),
    ("anxious", -0.25, 0.75),
    ("desperate", -0.6, 0.8),
    ("serious", -0.333, 0.667),
    ("urgent", -0.2, 0.6),
    ("emergency", -0.3, 0.5),
    ("threat", -0.5, 0.6),
    ("lose", -0.3, 0.4),
    ("lost", -0.2, 0.3),
    ("loss", -0.4, 0.4),
    ("broke", -0.4, 0.5),
    ("problem", -0.3, 0.4),
    ("trouble", -0.4, 0.5),
    ("fail", -0.5, 0.3),
    ("failed", -0.5, 0.3),
    ("failure", -0.316, 0.3),
    ("hurt", -0.5, 0.7),
    ("pain", -0.5, 0.6),
    ("painful", -0.7, 0.9),
    ("annoying", -0.8, 0.9),
    ("annoyed", -0.5, 0.8),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("boring", -1.0, 1.0),
    ("useless", -0.5, 0.2),
    ("difficult", -0.5, 1.0),
    ("hard", -0.292, 0.542),
    ("negative", -0.3, 0.4),
    ("risky", -0.3, 0.7),
    ("sorry", -0.5, 1.0),
    ("crazy", -0.6, 0.9),
    ("sick", -0.714, 0.857),
    ("tired", -0.4, 0.7),
    ("lonely", -0.5, 0.8),
    ("cruel", -1.0, 1.0),
    ("nasty", -1.0, 1.0),
    ("disgusting", -1.0, 1.0),
    ("guilty", -0.5, 0.6),
];

/// Words that scale the next rated word, with their multiplier
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("too", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.5),
    ("totally", 1.3),
    ("highly", 1.3),
    ("super", 1.3),
    ("most", 1.3),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("rather", 1.1),
    ("somewhat", 0.75),
    ("slightly", 0.5),
    ("barely", 0.5),
];

/// Words that reverse the next rated word
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nothing", "cannot", "without",
];

static LEXICON: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|&(word, polarity, subjectivity)| (word, (polarity, subjectivity)))
        .collect()
});

static INTENSITY: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIERS.iter().copied().collect());

/// `(polarity, subjectivity)` of a lowercase word, if rated
pub fn rating(word: &str) -> Option<(f64, f64)> {
    LEXICON.get(word).copied()
}

/// Multiplier of a lowercase intensifier
pub fn intensity(word: &str) -> Option<f64> {
    INTENSITY.get(word).copied()
}

/// Whether a lowercase token negates what follows
pub fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't") || word.ends_with("n’t")
}

//! Emotion labels and per-face confidence scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of labels produced by the face emotion model.
///
/// Declaration order is canonical: it is the order the model reports labels
/// in and the order used to break ties when picking the dominant emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// All labels in canonical order
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown emotion label '{s}'"))
    }
}

/// Confidence percentages (0-100) for each emotion label.
///
/// Labels the model did not report default to zero. Values coming from the
/// model should pass through [`EmotionScores::sanitized`] before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionScores {
    pub angry: f64,
    pub disgust: f64,
    pub fear: f64,
    pub happy: f64,
    pub sad: f64,
    pub surprise: f64,
    pub neutral: f64,
}

impl EmotionScores {
    /// Upper bound of a single confidence value
    pub const MAX_CONFIDENCE: f64 = 100.0;

    /// Scores with every label set to zero
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build scores from `(label, confidence)` pairs; later pairs win
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Emotion, f64)>,
    {
        let mut scores = Self::zero();
        for (emotion, value) in pairs {
            scores.set(emotion, value);
        }
        scores.sanitized()
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Angry => self.angry,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Surprise => self.surprise,
            Emotion::Neutral => self.neutral,
        }
    }

    pub fn set(&mut self, emotion: Emotion, value: f64) {
        let slot = match emotion {
            Emotion::Angry => &mut self.angry,
            Emotion::Disgust => &mut self.disgust,
            Emotion::Fear => &mut self.fear,
            Emotion::Happy => &mut self.happy,
            Emotion::Sad => &mut self.sad,
            Emotion::Surprise => &mut self.surprise,
            Emotion::Neutral => &mut self.neutral,
        };
        *slot = value;
    }

    /// Copy with NaN replaced by zero and every value clamped to [0, 100]
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for emotion in Emotion::ALL {
            let value = self.get(emotion);
            let clean = if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, Self::MAX_CONFIDENCE)
            };
            self.set(emotion, clean);
        }
        self
    }

    /// Highest-confidence label; ties go to the earliest label in canonical order
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = (Emotion::Angry, self.angry);
        for emotion in Emotion::ALL.into_iter().skip(1) {
            let value = self.get(emotion);
            if value > best.1 {
                best = (emotion, value);
            }
        }
        best
    }

    /// Iterate `(label, confidence)` in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }
}

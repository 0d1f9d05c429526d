//! Message and classification result types
//!
//! All values here are created fresh for one analysis and dropped with it.
//! Classifier output is index-aligned with the message sequence: the sentiment
//! and emotion results at position `i` belong to message `i`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown wherever a message has no emotion scores
pub const NO_EMOTION: &str = "none";

/// One input message, identified only by its position in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    pub text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Sentiment polarity as reported by the sentiment classifier
///
/// Binary classifiers only ever produce `Positive` or `Negative`. Anything else
/// a substituted classifier returns is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Other(label) => label,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            _ => SentimentLabel::Other(label),
        }
    }
}

impl From<&str> for SentimentLabel {
    fn from(label: &str) -> Self {
        SentimentLabel::from(label.to_string())
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment classification of a single message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Classifier confidence (0.0-1.0)
    pub score: f64,
}

impl SentimentResult {
    pub fn new(label: impl Into<SentimentLabel>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Score for one emotion label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    /// Independent per-label probability (0.0-1.0)
    pub score: f64,
}

impl EmotionScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Emotion scores for one message, in the order the classifier returned them
///
/// Multi-label: scores need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionScores(pub Vec<EmotionScore>);

impl EmotionScores {
    pub fn new(scores: Vec<EmotionScore>) -> Self {
        Self(scores)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmotionScore> {
        self.0.iter()
    }

    /// Highest `n` scores, descending; equal scores keep classifier order
    pub fn top_n(&self, n: usize) -> Vec<EmotionScore> {
        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        sorted.truncate(n);
        sorted
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, score)| EmotionScore::new(label, score))
                .collect(),
        )
    }
}

/// Winning emotion for one message
///
/// `None` is the explicit sentinel for a message whose classifier output was empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum TopEmotion {
    Label(String),
    None,
}

impl TopEmotion {
    pub fn label(&self) -> Option<&str> {
        match self {
            TopEmotion::Label(label) => Some(label),
            TopEmotion::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TopEmotion::None)
    }
}

impl fmt::Display for TopEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or(NO_EMOTION))
    }
}

impl From<TopEmotion> for String {
    fn from(top: TopEmotion) -> Self {
        top.to_string()
    }
}

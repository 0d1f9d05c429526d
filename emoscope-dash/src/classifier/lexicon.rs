//! Offline word-list classifier
//!
//! Rule-based stand-in for the hosted models when no network is available.
//! Sentiment averages word polarities with negation flips and intensifier
//! scaling. Emotion scores come from keyword hits per label over a 28-label
//! taxonomy; each label is scored independently, so scores do not sum to 1.

use async_trait::async_trait;
use emoscope_common::{EmotionScore, EmotionScores, SentimentLabel, SentimentResult};
use std::collections::HashMap;

use super::{ClassifierError, EmotionClassifier, SentimentClassifier};

/// Emotion labels in the order every result lists them
pub const EMOTION_TAXONOMY: [&str; 28] = [
    "admiration",
    "amusement",
    "anger",
    "annoyance",
    "approval",
    "caring",
    "confusion",
    "curiosity",
    "desire",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "excitement",
    "fear",
    "gratitude",
    "grief",
    "joy",
    "love",
    "nervousness",
    "optimism",
    "pride",
    "realization",
    "relief",
    "remorse",
    "sadness",
    "surprise",
    "neutral",
];

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("love", 0.9),
    ("loved", 0.9),
    ("awesome", 0.9),
    ("amazing", 0.9),
    ("excellent", 0.9),
    ("fantastic", 0.9),
    ("wonderful", 0.9),
    ("great", 0.8),
    ("happy", 0.8),
    ("glad", 0.7),
    ("good", 0.6),
    ("nice", 0.6),
    ("like", 0.5),
    ("enjoy", 0.7),
    ("enjoyed", 0.7),
    ("thanks", 0.6),
    ("thank", 0.6),
    ("best", 0.8),
    ("beautiful", 0.8),
    ("perfect", 0.9),
    ("fun", 0.7),
    ("funny", 0.6),
    ("helpful", 0.7),
    ("proud", 0.7),
    ("hope", 0.5),
    ("excited", 0.8),
    ("cool", 0.5),
    ("brilliant", 0.9),
    ("recommend", 0.6),
    ("works", 0.4),
    ("fast", 0.4),
    ("easy", 0.5),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("hate", -0.9),
    ("hated", -0.9),
    ("awful", -0.9),
    ("terrible", -0.9),
    ("horrible", -0.9),
    ("worst", -0.9),
    ("bad", -0.7),
    ("sad", -0.7),
    ("angry", -0.8),
    ("annoying", -0.6),
    ("annoyed", -0.6),
    ("disappointed", -0.7),
    ("disappointing", -0.7),
    ("broken", -0.6),
    ("slow", -0.4),
    ("useless", -0.8),
    ("boring", -0.6),
    ("ugly", -0.7),
    ("scared", -0.6),
    ("afraid", -0.6),
    ("sorry", -0.4),
    ("problem", -0.5),
    ("fail", -0.7),
    ("failed", -0.7),
    ("wrong", -0.5),
    ("disgusting", -0.9),
    ("stupid", -0.8),
    ("poor", -0.6),
    ("crash", -0.7),
    ("bug", -0.5),
    ("lost", -0.5),
];

const EMOTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("admiration", &["impressive", "impressed", "brilliant", "amazing", "beautiful", "admire", "incredible"]),
    ("amusement", &["funny", "lol", "haha", "hilarious", "lmao", "fun", "joke"]),
    ("anger", &["angry", "furious", "hate", "hated", "rage", "mad", "outraged"]),
    ("annoyance", &["annoying", "annoyed", "irritating", "ugh", "tired", "frustrating", "frustrated"]),
    ("approval", &["agree", "approve", "good", "right", "yes", "fine", "correct"]),
    ("caring", &["care", "hug", "support", "help", "safe", "comfort"]),
    ("confusion", &["confused", "confusing", "unclear", "huh", "lost", "understand"]),
    ("curiosity", &["wonder", "curious", "why", "how", "interesting", "what"]),
    ("desire", &["want", "wish", "crave", "need", "hoping", "longing"]),
    ("disappointment", &["disappointed", "disappointing", "letdown", "expected", "meh", "unfortunately"]),
    ("disapproval", &["disagree", "wrong", "shouldn't", "unacceptable", "bad", "nope"]),
    ("disgust", &["disgusting", "gross", "nasty", "vile", "sick", "revolting"]),
    ("embarrassment", &["embarrassed", "embarrassing", "awkward", "ashamed", "cringe"]),
    ("excitement", &["excited", "exciting", "thrilled", "wow", "can't", "finally"]),
    ("fear", &["scared", "afraid", "terrified", "fear", "scary", "frightened"]),
    ("gratitude", &["thanks", "thank", "grateful", "appreciate", "appreciated", "thx"]),
    ("grief", &["grief", "mourning", "passed", "funeral", "loss", "died"]),
    ("joy", &["happy", "glad", "joy", "great", "delighted", "enjoy", "enjoyed"]),
    ("love", &["love", "loved", "adore", "lovely", "heart", "favorite"]),
    ("nervousness", &["nervous", "anxious", "worried", "worry", "stress", "stressed"]),
    ("optimism", &["hope", "hopefully", "optimistic", "better", "soon", "confident"]),
    ("pride", &["proud", "accomplished", "achievement", "earned", "nailed"]),
    ("realization", &["realized", "realize", "noticed", "turns", "understood", "oh"]),
    ("relief", &["relieved", "relief", "phew", "finally", "whew"]),
    ("remorse", &["sorry", "apologize", "regret", "fault", "mistake"]),
    ("sadness", &["sad", "unhappy", "depressed", "cry", "crying", "miss", "lonely"]),
    ("surprise", &["surprised", "surprising", "unexpected", "shocked", "whoa", "omg"]),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nobody", "nothing", "nowhere", "none", "cannot", "cant",
    "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt",
    "aren't", "arent", "wasn't", "wasnt", "weren't", "werent", "hardly", "barely",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.4),
    ("so", 1.3),
    ("extremely", 2.0),
    ("super", 1.6),
    ("totally", 1.5),
    ("absolutely", 1.8),
    ("incredibly", 1.8),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("kinda", 0.7),
];

/// Score contributed by one full-strength keyword hit is `1 - HIT_DECAY`
const HIT_DECAY: f64 = 0.6;
const EMOTION_FLOOR: f64 = 0.01;
const NEUTRAL_WHEN_SILENT: f64 = 0.85;

/// Word-list sentiment and emotion classifier
pub struct LexiconClassifier {
    polarity: HashMap<&'static str, f64>,
    emotion_index: HashMap<&'static str, Vec<usize>>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let polarity = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .copied()
            .collect();

        let mut emotion_index: HashMap<&'static str, Vec<usize>> = HashMap::new();
        for (label, keywords) in EMOTION_KEYWORDS {
            let position = EMOTION_TAXONOMY
                .iter()
                .position(|l| l == label)
                .unwrap_or(EMOTION_TAXONOMY.len() - 1);
            for keyword in keywords.iter() {
                emotion_index.entry(*keyword).or_default().push(position);
            }
        }

        Self {
            polarity,
            emotion_index,
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Mean word polarity in [-1, 1]; 0 when nothing matched
    pub fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        self.walk(text, |word, negated, weight| {
            if let Some(&score) = self.polarity.get(word) {
                let signed = if negated { -score } else { score };
                scores.push(signed * weight);
            }
        });

        if scores.is_empty() {
            0.0
        } else {
            (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
        }
    }

    /// Independent score per taxonomy label, in taxonomy order
    pub fn emotion_scores(&self, text: &str) -> EmotionScores {
        let mut weights = [0.0_f64; EMOTION_TAXONOMY.len()];
        self.walk(text, |word, negated, weight| {
            // a negated emotion word is not evidence for that emotion
            if negated {
                return;
            }
            if let Some(labels) = self.emotion_index.get(word) {
                for &i in labels {
                    weights[i] += weight;
                }
            }
        });

        let neutral = EMOTION_TAXONOMY.len() - 1;
        let evidence: f64 = weights[..neutral].iter().sum();
        weights[neutral] = 0.0;

        EmotionScores::new(
            EMOTION_TAXONOMY
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let score = if i == neutral {
                        if evidence == 0.0 {
                            NEUTRAL_WHEN_SILENT
                        } else {
                            (0.1 / (1.0 + evidence)).max(EMOTION_FLOOR)
                        }
                    } else {
                        (1.0 - HIT_DECAY.powf(weights[i])).clamp(EMOTION_FLOOR, 0.99)
                    };
                    EmotionScore::new(*label, score)
                })
                .collect(),
        )
    }

    /// Visit each word with the pending negation flag and intensifier weight
    fn walk<F>(&self, text: &str, mut on_word: F)
    where
        F: FnMut(&str, bool, f64),
    {
        let mut negate_next = false;
        let mut intensifier = 1.0;

        for token in tokenize(text) {
            let word = token.as_str();
            if NEGATIONS.contains(&word) {
                negate_next = true;
                continue;
            }
            if let Some(&mult) = self.intensifiers.get(word) {
                intensifier = mult;
                continue;
            }

            // modifiers apply to the next word only, matched or not
            on_word(word, negate_next, intensifier);
            negate_next = false;
            intensifier = 1.0;
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        let polarity = self.polarity(text);
        let label = if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Positive
        };
        Ok(SentimentResult::new(label, 0.5 + 0.5 * polarity.abs()))
    }
}

#[async_trait]
impl EmotionClassifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify_emotions(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        Ok(self.emotion_scores(text))
    }
}

//! Aggregation of per-message classifier output
//!
//! Every function here is a pure reduction over in-memory slices. Label tables
//! are returned as vectors ordered by first encounter, which is what the
//! tie-breaking rules below depend on:
//!
//! - corpus-wide top emotion: highest average, earliest-inserted label wins ties
//! - per-message top emotion: highest score, first label in classifier order wins ties
//!
//! Callers must not invoke the [`Aggregator`] with an empty batch; the analysis
//! entry point short-circuits that case before classification.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::export::ExportRow;
use crate::model::{EmotionScore, EmotionScores, Message, SentimentLabel, SentimentResult, TopEmotion};

/// Classifier output is not index-aligned with the messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "misaligned input: {messages} messages, {sentiments} sentiment results, {emotions} emotion score sets"
)]
pub struct MisalignedInputError {
    pub messages: usize,
    pub sentiments: usize,
    pub emotions: usize,
}

/// Number of occurrences of one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Count of one sentiment label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentCount {
    pub label: SentimentLabel,
    pub count: usize,
}

/// Sentiment distribution over a batch
///
/// Only POSITIVE and NEGATIVE get a percentage. Other labels are counted in
/// `counts` but not summarized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub total: usize,
    pub counts: Vec<SentimentCount>,
    pub positive_percent: f64,
    pub negative_percent: f64,
}

impl SentimentSummary {
    pub fn count_of(&self, label: &SentimentLabel) -> usize {
        self.counts
            .iter()
            .find(|c| &c.label == label)
            .map_or(0, |c| c.count)
    }

    /// Percentage of `total` carrying `label`
    pub fn percent_of(&self, label: &SentimentLabel) -> f64 {
        percent(self.count_of(label), self.total)
    }
}

/// Everything derived from one batch of classified messages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub average_emotion_scores: Vec<EmotionScore>,
    pub top_emotion_overall: Option<String>,
    pub sentiment: SentimentSummary,
    pub dominant_emotion_counts: Vec<LabelCount>,
    pub per_message_top_emotion: Vec<TopEmotion>,
    pub export_table: Vec<ExportRow>,
}

impl AggregateReport {
    pub fn average_score(&self, label: &str) -> Option<f64> {
        self.average_emotion_scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
    }

    pub fn dominant_count(&self, label: &str) -> usize {
        self.dominant_emotion_counts
            .iter()
            .find(|c| c.label == label)
            .map_or(0, |c| c.count)
    }
}

/// Builds an [`AggregateReport`] from index-aligned classifier output
pub struct Aggregator;

impl Aggregator {
    /// Aggregate one batch
    ///
    /// Fails with [`MisalignedInputError`] unless all three slices have the same length.
    pub fn aggregate(
        messages: &[Message],
        sentiments: &[SentimentResult],
        emotions: &[EmotionScores],
    ) -> Result<AggregateReport, MisalignedInputError> {
        check_alignment(messages, sentiments, emotions)?;

        let average_emotion_scores = compute_average_emotion_scores(emotions);
        let top_emotion_overall = select_top_overall_emotion(&average_emotion_scores);
        let per_message_top_emotion: Vec<TopEmotion> =
            emotions.iter().map(select_per_message_top_emotion).collect();
        let dominant_emotion_counts = tally_top_emotions(&per_message_top_emotion);
        let sentiment = build_sentiment_summary(sentiments);
        let export_table = build_export_table(messages, sentiments, &per_message_top_emotion)?;

        Ok(AggregateReport {
            average_emotion_scores,
            top_emotion_overall,
            sentiment,
            dominant_emotion_counts,
            per_message_top_emotion,
            export_table,
        })
    }
}

fn check_alignment(
    messages: &[Message],
    sentiments: &[SentimentResult],
    emotions: &[EmotionScores],
) -> Result<(), MisalignedInputError> {
    if messages.len() == sentiments.len() && messages.len() == emotions.len() {
        Ok(())
    } else {
        Err(MisalignedInputError {
            messages: messages.len(),
            sentiments: sentiments.len(),
            emotions: emotions.len(),
        })
    }
}

/// Mean score per emotion label
///
/// The denominator for a label is the number of messages that include it. With a
/// full-coverage classifier this equals the batch size.
pub fn compute_average_emotion_scores(emotions: &[EmotionScores]) -> Vec<EmotionScore> {
    // (label, sum, occurrences) in first-encounter order
    let mut totals: Vec<(String, f64, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for scores in emotions {
        for entry in scores.iter() {
            match index.get(&entry.label) {
                Some(&i) => {
                    totals[i].1 += entry.score;
                    totals[i].2 += 1;
                }
                None => {
                    index.insert(entry.label.clone(), totals.len());
                    totals.push((entry.label.clone(), entry.score, 1));
                }
            }
        }
    }

    totals
        .into_iter()
        .map(|(label, sum, n)| EmotionScore::new(label, sum / n as f64))
        .collect()
}

/// Label with the highest average; `None` for an empty table
pub fn select_top_overall_emotion(averages: &[EmotionScore]) -> Option<String> {
    argmax(averages).map(|best| best.label.clone())
}

/// Label with the highest score for one message
///
/// Returns [`TopEmotion::None`] when the classifier produced no scores.
pub fn select_per_message_top_emotion(scores: &EmotionScores) -> TopEmotion {
    match argmax(&scores.0) {
        Some(best) => TopEmotion::Label(best.label.clone()),
        None => TopEmotion::None,
    }
}

/// How many messages each label won
///
/// Labels that never win are absent.
pub fn build_dominant_emotion_histogram(emotions: &[EmotionScores]) -> Vec<LabelCount> {
    let tops: Vec<TopEmotion> = emotions.iter().map(select_per_message_top_emotion).collect();
    tally_top_emotions(&tops)
}

fn tally_top_emotions(tops: &[TopEmotion]) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = Vec::new();
    for label in tops.iter().filter_map(TopEmotion::label) {
        match counts.iter_mut().find(|c| c.label == label) {
            Some(entry) => entry.count += 1,
            None => counts.push(LabelCount {
                label: label.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

/// Sentiment label counts plus POSITIVE/NEGATIVE percentages
pub fn build_sentiment_summary(sentiments: &[SentimentResult]) -> SentimentSummary {
    let mut counts: Vec<SentimentCount> = Vec::new();
    for result in sentiments {
        match counts.iter_mut().find(|c| c.label == result.label) {
            Some(entry) => entry.count += 1,
            None => counts.push(SentimentCount {
                label: result.label.clone(),
                count: 1,
            }),
        }
    }

    let total = sentiments.len();
    let count_of = |label: &SentimentLabel| {
        counts
            .iter()
            .find(|c| &c.label == label)
            .map_or(0, |c| c.count)
    };
    let positive_percent = percent(count_of(&SentimentLabel::Positive), total);
    let negative_percent = percent(count_of(&SentimentLabel::Negative), total);

    SentimentSummary {
        total,
        counts,
        positive_percent,
        negative_percent,
    }
}

/// One export row per message, zipping values that are already computed
pub fn build_export_table(
    messages: &[Message],
    sentiments: &[SentimentResult],
    top_emotions: &[TopEmotion],
) -> Result<Vec<ExportRow>, MisalignedInputError> {
    if messages.len() != sentiments.len() || messages.len() != top_emotions.len() {
        return Err(MisalignedInputError {
            messages: messages.len(),
            sentiments: sentiments.len(),
            emotions: top_emotions.len(),
        });
    }

    Ok(messages
        .iter()
        .zip(sentiments)
        .zip(top_emotions)
        .map(|((message, sentiment), top)| ExportRow {
            text: message.text.clone(),
            sentiment: sentiment.label.to_string(),
            sentiment_score: sentiment.score,
            top_emotion: top.to_string(),
        })
        .collect())
}

/// First entry with the strictly greatest score
fn argmax(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    let mut best: Option<&EmotionScore> = None;
    for entry in scores {
        match best {
            Some(current) if entry.score > current.score => best = Some(entry),
            Some(_) => {}
            None => best = Some(entry),
        }
    }
    best
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> EmotionScores {
        pairs.iter().map(|&(l, s)| (l, s)).collect()
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        let s = scores(&[("anger", 0.4), ("joy", 0.4), ("fear", 0.1)]);
        assert_eq!(
            select_per_message_top_emotion(&s),
            TopEmotion::Label("anger".to_string())
        );
    }

    #[test]
    fn test_argmax_ignores_nan_after_first() {
        let s = scores(&[("joy", 0.2), ("anger", f64::NAN), ("fear", 0.3)]);
        assert_eq!(
            select_per_message_top_emotion(&s),
            TopEmotion::Label("fear".to_string())
        );
    }

    #[test]
    fn test_average_uses_per_label_occurrences() {
        let emotions = vec![
            scores(&[("joy", 0.6), ("anger", 0.2)]),
            scores(&[("joy", 0.2)]),
        ];
        let averages = compute_average_emotion_scores(&emotions);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].label, "joy");
        assert!((averages[0].score - 0.4).abs() < 1e-12);
        // anger appears once, so its mean is its single score
        assert!((averages[1].score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_top_overall_empty() {
        assert_eq!(select_top_overall_emotion(&[]), None);
    }

    #[test]
    fn test_percent_of_empty_batch() {
        let summary = build_sentiment_summary(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.positive_percent, 0.0);
        assert_eq!(summary.negative_percent, 0.0);
    }

    #[test]
    fn test_export_table_misaligned() {
        let err = build_export_table(
            &[Message::from("a")],
            &[],
            &[TopEmotion::None],
        )
        .unwrap_err();
        assert_eq!(err.messages, 1);
        assert_eq!(err.sentiments, 0);
    }
}

//! Dashboard view model
//!
//! Turns one batch's classifier output and [`AggregateReport`] into what the page
//! renders: summary counters, chart series, insight sentences, the per-message
//! detail tabs and the export table.

use emoscope_common::aggregate::LabelCount;
use emoscope_common::export::{write_csv, ExportRow};
use emoscope_common::model::TopEmotion;
use emoscope_common::{
    AggregateReport, EmotionScore, EmotionScores, Message, SentimentLabel, SentimentResult,
};
use serde::Serialize;

/// Characters of message text shown in detail tabs
pub const PREVIEW_CHARS: usize = 150;

/// Emotions listed per message in the emotion tab
const DETAIL_TOP_EMOTIONS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryCounters {
    pub total_messages: usize,
    pub positive_percent: f64,
    pub negative_percent: f64,
    pub top_emotion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentSlice {
    pub label: SentimentLabel,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentDetail {
    pub index: usize,
    pub preview: String,
    pub sentiment: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmotionDetail {
    pub index: usize,
    pub preview: String,
    pub top_emotion: TopEmotion,
    pub top_emotions: Vec<EmotionScore>,
}

/// Everything the dashboard page renders for one analysis
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: SummaryCounters,
    pub sentiment: Vec<SentimentSlice>,
    /// Average score per emotion, highest first
    pub emotion_chart: Vec<EmotionScore>,
    /// Messages won per emotion, every observed label present, taxonomy order
    pub dominant_chart: Vec<LabelCount>,
    pub insights: Vec<String>,
    pub sentiment_details: Vec<SentimentDetail>,
    pub emotion_details: Vec<EmotionDetail>,
    pub export: Vec<ExportRow>,
    pub export_csv: String,
}

impl Dashboard {
    /// Build the view for one batch; all slices are index-aligned with `messages`
    pub fn build(
        messages: &[Message],
        sentiments: &[SentimentResult],
        emotions: &[EmotionScores],
        report: &AggregateReport,
    ) -> emoscope_common::Result<Self> {
        let summary = SummaryCounters {
            total_messages: messages.len(),
            positive_percent: report.sentiment.positive_percent,
            negative_percent: report.sentiment.negative_percent,
            top_emotion: report
                .top_emotion_overall
                .clone()
                .unwrap_or_else(|| TopEmotion::None.to_string()),
        };

        let sentiment = report
            .sentiment
            .counts
            .iter()
            .map(|c| SentimentSlice {
                label: c.label.clone(),
                count: c.count,
                percent: report.sentiment.percent_of(&c.label),
            })
            .collect();

        let mut emotion_chart = report.average_emotion_scores.clone();
        // stable sort keeps taxonomy order among equal averages
        emotion_chart.sort_by(|a, b| b.score.total_cmp(&a.score));

        let sentiment_details = messages
            .iter()
            .zip(sentiments)
            .enumerate()
            .map(|(index, (message, result))| SentimentDetail {
                index,
                preview: preview(&message.text),
                sentiment: result.label.clone(),
                score: result.score,
            })
            .collect();

        let emotion_details = messages
            .iter()
            .zip(emotions)
            .zip(&report.per_message_top_emotion)
            .enumerate()
            .map(|(index, ((message, scores), top))| EmotionDetail {
                index,
                preview: preview(&message.text),
                top_emotion: top.clone(),
                top_emotions: scores.top_n(DETAIL_TOP_EMOTIONS),
            })
            .collect();

        Ok(Self {
            summary,
            sentiment,
            emotion_chart,
            dominant_chart: normalized_dominant_counts(report),
            insights: build_insights(report),
            sentiment_details,
            emotion_details,
            export: report.export_table.clone(),
            export_csv: write_csv(&report.export_table)?,
        })
    }
}

/// First [`PREVIEW_CHARS`] characters, with "..." appended when cut
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Dominant-emotion histogram with zero-win labels filled in
pub fn normalized_dominant_counts(report: &AggregateReport) -> Vec<LabelCount> {
    report
        .average_emotion_scores
        .iter()
        .map(|s| LabelCount {
            label: s.label.clone(),
            count: report.dominant_count(&s.label),
        })
        .collect()
}

/// Plain-language observations for the insights block
pub fn build_insights(report: &AggregateReport) -> Vec<String> {
    let mut insights = Vec::new();
    let summary = &report.sentiment;
    let total = summary.total;

    let positive = summary.count_of(&SentimentLabel::Positive);
    let negative = summary.count_of(&SentimentLabel::Negative);
    insights.push(if positive > negative {
        format!(
            "Overall mood is positive: {:.1}% of messages are positive.",
            summary.positive_percent
        )
    } else if negative > positive {
        format!(
            "Overall mood is negative: {:.1}% of messages are negative.",
            summary.negative_percent
        )
    } else {
        "Sentiment is evenly split between positive and negative messages.".to_string()
    });

    let other: Vec<&str> = summary
        .counts
        .iter()
        .filter(|c| matches!(c.label, SentimentLabel::Other(_)))
        .map(|c| c.label.as_str())
        .collect();
    let other_count = total - positive - negative;
    if other_count > 0 {
        insights.push(format!(
            "{} {} received other sentiment labels ({}).",
            other_count,
            plural(other_count, "message", "messages"),
            other.join(", ")
        ));
    }

    if let Some(top) = &report.top_emotion_overall {
        let average = report.average_score(top).unwrap_or_default();
        insights.push(format!(
            "The strongest emotion overall is {} (average score {:.2}).",
            top, average
        ));
    }

    let mut most_dominant: Option<&LabelCount> = None;
    for entry in &report.dominant_emotion_counts {
        if most_dominant.map_or(true, |best| entry.count > best.count) {
            most_dominant = Some(entry);
        }
    }
    if let Some(entry) = most_dominant {
        insights.push(format!(
            "{} is the dominant emotion in {} of {} {}.",
            entry.label,
            entry.count,
            total,
            plural(total, "message", "messages")
        ));
    }

    let unscored = report
        .per_message_top_emotion
        .iter()
        .filter(|t| t.is_none())
        .count();
    if unscored > 0 {
        insights.push(format!(
            "{} {} returned no emotion scores.",
            unscored,
            plural(unscored, "message", "messages")
        ));
    }

    insights
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

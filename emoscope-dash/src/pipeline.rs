//! Analysis pipeline: classify every message, aggregate, build the dashboard
//!
//! One call handles one user interaction from start to finish. Messages are
//! classified one at a time in input order, so every result stays index-aligned
//! with its message.

use chrono::{DateTime, Utc};
use emoscope_common::{Aggregator, EmotionScores, Message, SentimentResult};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::classifier::ClassifierService;
use crate::dashboard::Dashboard;
use crate::error::{ApiError, ApiResult};

/// Prompt returned when there is nothing to analyze
pub const NO_INPUT_PROMPT: &str = "Upload a CSV file with a 'text' column or paste messages to begin.";

/// Outcome of one analysis request
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// No messages were supplied; nothing was classified
    NoInput { prompt: String },
    Report(Box<AnalysisReport>),
}

impl AnalysisOutcome {
    pub fn no_input() -> Self {
        AnalysisOutcome::NoInput {
            prompt: NO_INPUT_PROMPT.to_string(),
        }
    }
}

/// Completed analysis of one batch
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    /// Classifiers that produced the results
    pub classifier: String,
    pub dashboard: Dashboard,
}

/// Classify and aggregate `messages`
///
/// An empty batch short-circuits to [`AnalysisOutcome::NoInput`] before any
/// classifier is called. Batches larger than `max_messages` are rejected.
pub async fn analyze(
    classifiers: &ClassifierService,
    messages: Vec<Message>,
    max_messages: usize,
) -> ApiResult<AnalysisOutcome> {
    if messages.is_empty() {
        info!("No input supplied, awaiting messages");
        return Ok(AnalysisOutcome::no_input());
    }

    if messages.len() > max_messages {
        return Err(ApiError::BadRequest(format!(
            "Too many messages: {} (limit {})",
            messages.len(),
            max_messages
        )));
    }

    let analysis_id = Uuid::new_v4();
    let span = info_span!("analysis", %analysis_id, messages = messages.len());

    async move {
        let started = Instant::now();
        let (sentiments, emotions) = classify_all(classifiers, &messages).await?;

        let report = Aggregator::aggregate(&messages, &sentiments, &emotions)
            .map_err(emoscope_common::Error::from)?;
        let dashboard = Dashboard::build(&messages, &sentiments, &emotions, &report)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            top_emotion = report.top_emotion_overall.as_deref().unwrap_or("none"),
            positive_percent = report.sentiment.positive_percent,
            "Analysis complete"
        );

        Ok::<_, ApiError>(AnalysisOutcome::Report(Box::new(AnalysisReport {
            analysis_id,
            analyzed_at: Utc::now(),
            classifier: classifiers.describe(),
            dashboard,
        })))
    }
    .instrument(span)
    .await
}

/// Run both classifiers over every message, in order
pub async fn classify_all(
    classifiers: &ClassifierService,
    messages: &[Message],
) -> ApiResult<(Vec<SentimentResult>, Vec<EmotionScores>)> {
    let mut sentiments = Vec::with_capacity(messages.len());
    let mut emotions = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        let sentiment = classifiers
            .sentiment
            .classify_sentiment(&message.text)
            .await
            .map_err(|e| {
                warn!(index, error = %e, "Sentiment classification failed");
                e
            })?;
        let scores = classifiers
            .emotion
            .classify_emotions(&message.text)
            .await
            .map_err(|e| {
                warn!(index, error = %e, "Emotion classification failed");
                e
            })?;

        if scores.is_empty() {
            warn!(index, "Emotion classifier returned no scores");
        }

        sentiments.push(sentiment);
        emotions.push(scores);
    }

    Ok((sentiments, emotions))
}

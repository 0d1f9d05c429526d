//! Sentiment and emotion classifiers
//!
//! The dashboard treats both classifiers as opaque functions over one text.
//! [`ClassifierService`] owns one implementation of each and is built once at
//! startup, then shared through application state. Tests substitute their own
//! implementations.

pub mod inference;
pub mod lexicon;

use async_trait::async_trait;
use emoscope_common::config::{resolve_api_token, ClassifierBackend, ClassifierConfig};
use emoscope_common::{EmotionScores, SentimentResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use inference::InferenceClassifier;
pub use lexicon::LexiconClassifier;

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Inference API returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Model is still loading on the inference service
    #[error("Model {0} is loading, retry shortly")]
    ModelLoading(String),

    /// Failed to parse classifier output
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Binary sentiment classifier
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Name for logs and health output
    fn name(&self) -> &str;

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentResult, ClassifierError>;
}

/// Multi-label emotion classifier
///
/// Returns a score for every label in its taxonomy, in a stable order.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify_emotions(&self, text: &str) -> Result<EmotionScores, ClassifierError>;
}

/// The pair of classifiers used for every analysis
#[derive(Clone)]
pub struct ClassifierService {
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub emotion: Arc<dyn EmotionClassifier>,
}

impl ClassifierService {
    pub fn new(
        sentiment: Arc<dyn SentimentClassifier>,
        emotion: Arc<dyn EmotionClassifier>,
    ) -> Self {
        Self { sentiment, emotion }
    }

    /// Build the configured backend
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        match config.backend {
            ClassifierBackend::Inference => {
                let token = resolve_api_token(config);
                if token.is_none() {
                    warn!("No inference API token configured, requests may be throttled");
                }
                let sentiment = InferenceClassifier::new(config, &config.sentiment_model, token.clone())?;
                let emotion = InferenceClassifier::new(config, &config.emotion_model, token)?;
                info!(
                    sentiment_model = %config.sentiment_model,
                    emotion_model = %config.emotion_model,
                    endpoint = %config.endpoint,
                    "Using inference classifiers"
                );
                Ok(Self::new(Arc::new(sentiment), Arc::new(emotion)))
            }
            ClassifierBackend::Lexicon => {
                info!("Using offline lexicon classifiers");
                Ok(Self::lexicon())
            }
        }
    }

    /// Offline classifiers, no network access
    pub fn lexicon() -> Self {
        let lexicon = Arc::new(LexiconClassifier::new());
        Self::new(lexicon.clone(), lexicon)
    }

    /// "sentiment-name / emotion-name"
    pub fn describe(&self) -> String {
        format!("{} / {}", self.sentiment.name(), self.emotion.name())
    }
}

//! Hosted inference API client
//!
//! Sends one text per request to a text-classification model served over HTTP
//! (`POST <endpoint>/<model>`), in the request shape used by the Hugging Face
//! inference API:
//!
//! ```json
//! {"inputs": "text", "parameters": {"top_k": 64}, "options": {"wait_for_model": true}}
//! ```
//!
//! Responses are a list of `{label, score}` entries, either flat or nested one
//! level for the single input. Both shapes are accepted.

use async_trait::async_trait;
use emoscope_common::config::{get_user_agent, ClassifierConfig};
use emoscope_common::{EmotionScore, EmotionScores, SentimentLabel, SentimentResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

use super::{ClassifierError, EmotionClassifier, SentimentClassifier};

/// Upper bound on labels requested per call; larger than any emotion taxonomy in use
const ALL_LABELS_TOP_K: usize = 64;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<InferenceParameters>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

/// Client for one hosted text-classification model
pub struct InferenceClassifier {
    http_client: reqwest::Client,
    url: String,
    model: String,
    token: Option<String>,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl InferenceClassifier {
    /// Create a client for `model` using the endpoint, timeout and rate limit from `config`
    pub fn new(
        config: &ClassifierConfig,
        model: &str,
        token: Option<String>,
    ) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http_client,
            url: model_url(&config.endpoint, model),
            model: model.to_string(),
            token,
            rate_limiter,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn query(&self, text: &str, top_k: Option<usize>) -> Result<Vec<LabelScore>, ClassifierError> {
        self.rate_limiter.until_ready().await;

        let body = InferenceRequest {
            inputs: text,
            parameters: top_k.map(|top_k| InferenceParameters { top_k }),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        debug!(model = %self.model, chars = text.chars().count(), "Querying inference API");

        let mut request = self.http_client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ClassifierError::ModelLoading(self.model.clone()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        Ok(parsed.into_scores())
    }
}

#[async_trait]
impl SentimentClassifier for InferenceClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        let scores = self.query(text, None).await?;
        strongest(scores)
            .map(|best| SentimentResult::new(SentimentLabel::from(best.label), best.score))
            .ok_or_else(|| ClassifierError::Parse(format!("{} returned no labels", self.model)))
    }
}

#[async_trait]
impl EmotionClassifier for InferenceClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify_emotions(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        let scores = self.query(text, Some(ALL_LABELS_TOP_K)).await?;
        Ok(EmotionScores::new(
            scores
                .into_iter()
                .map(|s| EmotionScore::new(s.label, s.score))
                .collect(),
        ))
    }
}

fn model_url(endpoint: &str, model: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), model)
}

fn strongest(scores: Vec<LabelScore>) -> Option<LabelScore> {
    scores
        .into_iter()
        .reduce(|best, next| if next.score > best.score { next } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_url() {
        assert_eq!(
            model_url("https://example.test/models/", "SamLowe/roberta-base-go_emotions"),
            "https://example.test/models/SamLowe/roberta-base-go_emotions"
        );
    }

    #[test]
    fn test_nested_response() {
        let json = r#"[[{"label":"POSITIVE","score":0.99},{"label":"NEGATIVE","score":0.01}]]"#;
        let parsed: InferenceResponse = serde_json::from_str(json).unwrap();
        let scores = parsed.into_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "POSITIVE");
    }

    #[test]
    fn test_flat_response() {
        let json = r#"[{"label":"joy","score":0.7},{"label":"anger","score":0.1}]"#;
        let parsed: InferenceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_scores()[1].label, "anger");
    }

    #[test]
    fn test_strongest_picks_highest() {
        let scores = vec![
            LabelScore { label: "NEGATIVE".to_string(), score: 0.2 },
            LabelScore { label: "POSITIVE".to_string(), score: 0.8 },
        ];
        assert_eq!(strongest(scores).unwrap().label, "POSITIVE");
        assert!(strongest(Vec::new()).is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = InferenceRequest {
            inputs: "hello",
            parameters: None,
            options: InferenceOptions { wait_for_model: true },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "hello");
        assert!(json.get("parameters").is_none());
        assert_eq!(json["options"]["wait_for_model"], true);
    }

    #[test]
    fn test_client_creation() {
        let config = ClassifierConfig::default();
        let client = InferenceClassifier::new(&config, &config.emotion_model, None).unwrap();
        assert!(client.url().ends_with("/SamLowe/roberta-base-go_emotions"));
    }
}

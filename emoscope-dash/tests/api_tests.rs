//! Integration tests for emoscope-dash API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Guard clause for empty input
//! - Full analysis of pasted text and uploaded CSV
//! - CSV export as an attachment
//! - Error mapping for bad input and failing classifiers
//! - Embedded UI assets

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use emoscope_common::config::TomlConfig;
use emoscope_common::{EmotionScores, SentimentResult};
use emoscope_dash::classifier::{
    ClassifierError, ClassifierService, EmotionClassifier, SentimentClassifier,
};
use emoscope_dash::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Deterministic classifier keyed on words in the message
struct KeywordClassifier;

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        Ok(if text.contains("hate") {
            SentimentResult::new("NEGATIVE", 0.95)
        } else {
            SentimentResult::new("POSITIVE", 0.99)
        })
    }
}

#[async_trait]
impl EmotionClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify_emotions(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        let scores = if text.contains("love") {
            [("love", 0.9), ("anger", 0.05), ("joy", 0.3)]
        } else if text.contains("hate") {
            [("love", 0.01), ("anger", 0.7), ("joy", 0.02)]
        } else {
            [("love", 0.1), ("anger", 0.1), ("joy", 0.6)]
        };
        Ok(scores.into_iter().collect())
    }
}

/// Emotion classifier whose upstream is unreachable
struct UnreachableClassifier;

#[async_trait]
impl EmotionClassifier for UnreachableClassifier {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn classify_emotions(&self, _text: &str) -> Result<EmotionScores, ClassifierError> {
        Err(ClassifierError::Network("connection refused".to_string()))
    }
}

/// Test helper: Create app with keyword classifiers
fn setup_app() -> axum::Router {
    setup_app_with(keyword_service(), TomlConfig::default())
}

fn setup_app_with(classifiers: ClassifierService, config: TomlConfig) -> axum::Router {
    build_router(AppState::new(classifiers, &config))
}

fn keyword_service() -> ClassifierService {
    let keyword = Arc::new(KeywordClassifier);
    ClassifierService::new(keyword.clone(), keyword)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_text(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "emoscope-dash");
    assert_eq!(body["backend"], "inference");
    assert_eq!(body["classifiers"], "keyword / keyword");
    assert!(body["version"].is_string());
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let response = setup_app().oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Analysis
// =============================================================================

#[tokio::test]
async fn test_empty_input_returns_prompt() {
    for body in [json!({}), json!({"text": "   \n\n"}), json!({"csv": ""})] {
        let response = setup_app()
            .oneshot(post_json("/api/analyze", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "no_input");
        assert!(body["prompt"].as_str().unwrap().contains("text"));
        assert!(body.get("dashboard").is_none());
    }
}

#[tokio::test]
async fn test_empty_input_never_calls_classifier() {
    let unreachable = Arc::new(UnreachableClassifier);
    let classifiers = ClassifierService::new(Arc::new(KeywordClassifier), unreachable);
    let app = setup_app_with(classifiers, TomlConfig::default());

    let response = app
        .oneshot(post_json("/api/analyze", json!({"text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "no_input");
}

#[tokio::test]
async fn test_analyze_pasted_text() {
    let response = setup_app()
        .oneshot(post_json(
            "/api/analyze",
            json!({"text": "I love this!\nI hate this."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "report");
    assert_eq!(body["classifier"], "keyword / keyword");
    assert!(body["analysis_id"].is_string());

    let dashboard = &body["dashboard"];
    assert_eq!(dashboard["summary"]["total_messages"], 2);
    assert_eq!(dashboard["summary"]["positive_percent"], 50.0);
    assert_eq!(dashboard["summary"]["negative_percent"], 50.0);

    let sentiment = dashboard["sentiment"].as_array().unwrap();
    assert_eq!(sentiment.len(), 2);
    assert_eq!(sentiment[0]["label"], "POSITIVE");
    assert_eq!(sentiment[0]["count"], 1);
    assert_eq!(sentiment[1]["label"], "NEGATIVE");

    let details = dashboard["emotion_details"].as_array().unwrap();
    assert_eq!(details[0]["top_emotion"], "love");
    assert_eq!(details[1]["top_emotion"], "anger");

    let dominant = dashboard["dominant_chart"].as_array().unwrap();
    assert_eq!(dominant.len(), 3);
    let joy = dominant.iter().find(|d| d["label"] == "joy").unwrap();
    assert_eq!(joy["count"], 0);

    let export = dashboard["export"].as_array().unwrap();
    assert_eq!(export.len(), 2);
    assert_eq!(export[1]["text"], "I hate this.");
    assert_eq!(export[1]["sentiment"], "NEGATIVE");
}

#[tokio::test]
async fn test_csv_takes_precedence_over_text() {
    let response = setup_app()
        .oneshot(post_json(
            "/api/analyze",
            json!({
                "text": "ignored line",
                "csv": "id,text\n1,I love the new update\n2,\n3,Nice work\n"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let export = body["dashboard"]["export"].as_array().unwrap();
    let texts: Vec<&str> = export.iter().map(|r| r["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["I love the new update", "Nice work"]);
}

#[tokio::test]
async fn test_analyze_csv_upload() {
    let response = setup_app()
        .oneshot(post_text(
            "/api/analyze/csv",
            "text,author\nI love it,amy\nI hate waiting,bo\nfine,cy\n",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "report");
    assert_eq!(body["dashboard"]["summary"]["total_messages"], 3);
    // love averages 0.337 against joy 0.307 and anger 0.283
    assert_eq!(body["dashboard"]["summary"]["top_emotion"], "love");
}

#[tokio::test]
async fn test_csv_without_text_column_rejected() {
    let response = setup_app()
        .oneshot(post_text("/api/analyze/csv", "message,author\nhello,amy\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "COMMON_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("text"));
}

#[tokio::test]
async fn test_too_many_messages_rejected() {
    let config = TomlConfig {
        max_messages: 2,
        ..TomlConfig::default()
    };
    let app = setup_app_with(keyword_service(), config);

    let response = app
        .oneshot(post_json("/api/analyze", json!({"text": "a\nb\nc"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = TomlConfig {
        max_body_bytes: 64,
        ..TomlConfig::default()
    };
    let app = setup_app_with(keyword_service(), config);

    let response = app
        .oneshot(post_text("/api/analyze/csv", &"text\nhello\n".repeat(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_classifier_failure_is_bad_gateway() {
    let classifiers =
        ClassifierService::new(Arc::new(KeywordClassifier), Arc::new(UnreachableClassifier));
    let app = setup_app_with(classifiers, TomlConfig::default());

    let response = app
        .clone()
        .oneshot(post_json("/api/analyze", json!({"text": "hello"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CLASSIFIER_ERROR");

    // Failure is remembered for diagnostics
    let response = app.oneshot(get("/health")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["last_error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_returns_csv_attachment() {
    let response = setup_app()
        .oneshot(post_json(
            "/api/export",
            json!({"text": "I love this!\nI hate this."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("emotion_results.csv"));

    let csv = extract_text(response.into_body()).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "text,sentiment,sentiment_score,top_emotion");
    assert!(lines[1].starts_with("I love this!,POSITIVE,"));
    assert!(lines[2].ends_with(",anger"));
}

#[tokio::test]
async fn test_export_without_input_rejected() {
    let response = setup_app()
        .oneshot(post_json("/api/export", json!({"text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// UI
// =============================================================================

#[tokio::test]
async fn test_ui_assets_served() {
    let response = setup_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("/static/app.js"));

    let response = setup_app().oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/javascript"
    );

    let response = setup_app().oneshot(get("/static/app.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

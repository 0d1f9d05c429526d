//! emoscope-dash library interface
//!
//! Exposes the router, state, classifiers and pipeline for integration testing.

pub mod api;
pub mod classifier;
pub mod dashboard;
pub mod error;
pub mod pipeline;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use emoscope_common::config::{ClassifierBackend, TomlConfig};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::classifier::ClassifierService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Sentiment and emotion classifiers, built once at startup
    pub classifiers: ClassifierService,
    /// Backend the classifiers came from, reported by /health
    pub backend: ClassifierBackend,
    /// Largest batch accepted in one analysis
    pub max_messages: usize,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(classifiers: ClassifierService, config: &TomlConfig) -> Self {
        Self {
            classifiers,
            backend: config.classifier.backend,
            max_messages: config.max_messages,
            max_body_bytes: config.max_body_bytes,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember `error` for /health
    pub async fn record_error(&self, error: &ApiError) {
        *self.last_error.write().await = Some(error.to_string());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let body_limit = state.max_body_bytes;

    Router::new()
        // UI routes
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/app.css", get(api::serve_app_css))
        // API routes
        .route("/api/analyze", post(api::analyze_request))
        .route("/api/analyze/csv", post(api::analyze_csv_upload))
        .route("/api/export", post(api::export_results))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

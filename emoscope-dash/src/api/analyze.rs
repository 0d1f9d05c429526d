//! Analysis and export endpoints
//!
//! Every request is a complete interaction: ingest, classify, aggregate, respond.
//! Nothing is kept between requests.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use emoscope_common::ingest::AnalysisRequest;
use emoscope_common::Message;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{self, AnalysisOutcome};
use crate::AppState;

/// File name offered for the results download
pub const EXPORT_FILE_NAME: &str = "emotion_results.csv";

/// POST /api/analyze
///
/// Body: `{"text": "...", "csv": "..."}`, either field optional.
/// Returns `{"status": "no_input", ...}` or `{"status": "report", ...}`.
pub async fn analyze_request(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisOutcome>> {
    run(&state, request).await.map(Json)
}

/// POST /api/analyze/csv
///
/// Body: raw CSV document with a `text` column.
pub async fn analyze_csv_upload(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<AnalysisOutcome>> {
    run(&state, AnalysisRequest::from_csv(body)).await.map(Json)
}

/// POST /api/export
///
/// Same body as /api/analyze; responds with the results table as a CSV attachment.
pub async fn export_results(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Response> {
    match run(&state, request).await? {
        AnalysisOutcome::NoInput { prompt } => Err(ApiError::BadRequest(prompt)),
        AnalysisOutcome::Report(report) => {
            info!(rows = report.dashboard.export.len(), "Exporting results");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                    ),
                ],
                report.dashboard.export_csv,
            )
                .into_response())
        }
    }
}

async fn run(state: &AppState, request: AnalysisRequest) -> ApiResult<AnalysisOutcome> {
    let result = match ingest(request) {
        Ok(messages) => pipeline::analyze(&state.classifiers, messages, state.max_messages).await,
        Err(e) => Err(e),
    };

    if let Err(ref e) = result {
        state.record_error(e).await;
    }
    result
}

fn ingest(request: AnalysisRequest) -> ApiResult<Vec<Message>> {
    let from_csv = request.csv.as_deref().is_some_and(|c| !c.trim().is_empty());
    let messages = request.into_messages()?;
    info!(
        source = if from_csv { "csv" } else { "text" },
        count = messages.len(),
        "Received messages"
    );
    Ok(messages)
}

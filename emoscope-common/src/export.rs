//! Result table export
//!
//! CSV layout: header `text,sentiment,sentiment_score,top_emotion`, one row per
//! message in input order, no index column.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column names of the exported CSV, in order
pub const EXPORT_COLUMNS: [&str; 4] = ["text", "sentiment", "sentiment_score", "top_emotion"];

/// One exported message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub text: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub top_emotion: String,
}

/// Render rows as CSV text
///
/// The header is written even when there are no rows.
pub fn write_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        writer.write_record(EXPORT_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("CSV output is not UTF-8: {}", e)))
}

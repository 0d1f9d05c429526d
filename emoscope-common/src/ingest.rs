//! Message ingest from uploaded CSV or pasted text

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::model::Message;
use crate::{Error, Result};

/// Name of the CSV column holding message text
pub const TEXT_COLUMN: &str = "text";

/// Raw user input for one analysis
///
/// An uploaded CSV takes precedence over pasted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Free text, one message per line
    #[serde(default)]
    pub text: Option<String>,
    /// CSV document with a `text` column
    #[serde(default)]
    pub csv: Option<String>,
}

impl AnalysisRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            csv: None,
        }
    }

    pub fn from_csv(csv: impl Into<String>) -> Self {
        Self {
            text: None,
            csv: Some(csv.into()),
        }
    }

    /// Messages carried by this request, possibly none
    pub fn into_messages(self) -> Result<Vec<Message>> {
        match (self.csv, self.text) {
            (Some(csv), _) if !csv.trim().is_empty() => parse_csv(&csv),
            (_, Some(text)) => Ok(parse_pasted(&text)),
            _ => Ok(Vec::new()),
        }
    }
}

/// One message per non-blank line, trimmed
pub fn parse_pasted(text: &str) -> Vec<Message> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Message::from)
        .collect()
}

/// Messages from the `text` column of a CSV document
///
/// A header row is required. Other columns are ignored, as are rows whose
/// `text` cell is blank or missing.
pub fn parse_csv(csv: &str) -> Result<Vec<Message>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(csv.as_bytes());

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == TEXT_COLUMN)
        .ok_or_else(|| Error::MissingColumn(TEXT_COLUMN.to_string()))?;

    let mut messages = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(text) = record.get(column) {
            if !text.trim().is_empty() {
                messages.push(Message::from(text));
            }
        }
    }

    tracing::debug!(count = messages.len(), "Parsed messages from CSV");
    Ok(messages)
}

//! # Emoscope Common Library
//!
//! Shared code for the Emoscope dashboard including:
//! - Message and classification result types
//! - Aggregation of per-message classifier output into a report
//! - CSV and pasted-text ingest
//! - Result table export
//! - Configuration loading

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod model;

pub use aggregate::{AggregateReport, Aggregator, MisalignedInputError};
pub use error::{Error, Result};
pub use model::{EmotionScore, EmotionScores, Message, SentimentLabel, SentimentResult};

//! Common error types for Emoscope

use thiserror::Error;

use crate::aggregate::MisalignedInputError;

/// Common result type for Emoscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Emoscope crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded CSV lacks a required column
    #[error("CSV is missing the required '{0}' column")]
    MissingColumn(String),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Classifier output not index-aligned with the messages
    #[error(transparent)]
    Misaligned(#[from] MisalignedInputError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the service
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::MissingColumn(_) | Error::Csv(_)
        )
    }
}

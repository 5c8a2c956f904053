//! Error types for the questionnaire autofill engine.
//!
//! A single error enum covers every failure category. Only `Input` and
//! `IndexUnavailable` are allowed to abort a fill request; the engine recovers
//! from the others per question.

use thiserror::Error;

/// Unified error type for the autofill workspace.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base loading and indexing errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Malformed questionnaire input (missing question column, no questions)
    #[error("Input error: {0}")]
    Input(String),

    /// The knowledge index has never been loaded
    #[error("Knowledge index unavailable: {0}")]
    IndexUnavailable(String),

    /// Answer synthesis failed or timed out
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error must abort a whole fill request.
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, AppError::Input(_) | AppError::IndexUnavailable(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Serialization(format!("CSV: {}", err))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

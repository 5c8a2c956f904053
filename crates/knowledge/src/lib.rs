//! Questionnaire autofill engine.
//!
//! Answers questionnaire rows from a corpus of previously answered
//! questionnaires: a TF-IDF index finds lexical candidates, a concept matcher
//! re-ranks them with domain keywords, a synthesizer produces a grounded
//! answer (generated or verbatim), and a rule cascade scores confidence.

pub mod base;
pub mod config;
pub mod engine;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod output;
pub mod progress;
pub mod questionnaire;
pub mod scoring;
pub mod service;
pub mod stream;
pub mod synthesis;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use base::KnowledgeBase;
pub use config::{EngineConfig, KnowledgeManifest, Vocabulary};
pub use engine::{FillEngine, Pipeline};
pub use index::KnowledgeIndex;
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter, ProgressState};
pub use service::{provider_from_config, AutofillService};
pub use stream::{forward, parse_stream, stream_fill, StreamFrame, CSV_DELIMITER};
pub use synthesis::SynthesisProvider;
pub use types::{
    ConfidenceLevel, FillRecord, FillResult, HealthStatus, KnowledgeEntry, KnowledgeStats,
    QuestionRow, Summary,
};

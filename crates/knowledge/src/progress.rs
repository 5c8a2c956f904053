//! Structured progress reporting for fill requests.
//!
//! Progress moves through fixed milestones: 10 while parsing the input, 20 once
//! questions are counted, `20 + 60 * done / total` as questions complete, 85
//! while rendering output and 100 when the result is ready.

use crate::types::Summary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const PARSING: u8 = 10;
const COUNTED: u8 = 20;
const MATCHING_SPAN: usize = 60;
const GENERATING: u8 = 85;
const READY: u8 = 100;

/// Lifecycle state of a fill request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    Processing,
    Ready,
    Error,
}

/// Progress notification emitted during a fill request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub state: ProgressState,

    /// 0-100
    pub progress: u8,

    /// Human-readable message
    pub message: String,

    /// Suggested name for the filled file (ready only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
}

impl ProgressEvent {
    pub fn processing(progress: u8, message: impl Into<String>) -> Self {
        Self {
            state: ProgressState::Processing,
            progress,
            message: message.into(),
            output_filename: None,
        }
    }

    pub fn ready(message: impl Into<String>, output_filename: impl Into<String>) -> Self {
        Self {
            state: ProgressState::Ready,
            progress: READY,
            message: message.into(),
            output_filename: Some(output_filename.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: ProgressState::Error,
            progress: 0,
            message: message.into(),
            output_filename: None,
        }
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        format!("[{:>3}%] {}", self.progress, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            tracing::debug!(
                state = ?event.state,
                progress = event.progress,
                message = %event.message,
                elapsed_secs = self.start_time.elapsed().as_secs_f64(),
                "Progress event"
            );

            callback(event);
        }
    }

    pub fn parsing(&self) {
        self.emit(ProgressEvent::processing(PARSING, "Parsing input file..."));
    }

    pub fn questions_found(&self, total: usize) {
        self.emit(ProgressEvent::processing(
            COUNTED,
            format!("Found {} questions. Matching against knowledge base...", total),
        ));
    }

    pub fn question_done(&self, done: usize, total: usize) {
        self.emit(ProgressEvent::processing(
            matching_progress(done, total),
            format!("Matched question {}/{}", done, total),
        ));
    }

    pub fn generating(&self) {
        self.emit(ProgressEvent::processing(GENERATING, "Generating output file..."));
    }

    pub fn ready(&self, summary: &Summary, output_filename: &str) {
        self.emit(ProgressEvent::ready(
            format!(
                "Complete! {} high, {} medium, {} low, {} need review",
                summary.high, summary.medium, summary.low, summary.requires_human_attention
            ),
            output_filename,
        ));
    }

    pub fn error(&self, message: &str) {
        self.emit(ProgressEvent::error(message));
    }
}

/// Progress value after `done` of `total` questions completed.
pub fn matching_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return COUNTED;
    }
    let span = MATCHING_SPAN * done.min(total) / total;
    COUNTED + span as u8
}

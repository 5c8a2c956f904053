//! Engine type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Text returned when the evidence cannot answer a question.
pub const INSUFFICIENT_MARKER: &str = "Insufficient information in provided documents.";

/// One question/answer pair from the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Corpus insertion order, used for tie-breaking
    pub id: usize,

    /// Source document name (file stem or manifest name)
    pub source_document: String,

    /// Section heading the row belongs to
    pub section: String,

    /// Spreadsheet row number (header is row 1)
    pub row_index: u32,

    pub question_text: String,

    pub answer_text: String,
}

impl KnowledgeEntry {
    /// Citation string: `[<document> > <section> > Row <n>]`.
    pub fn citation(&self) -> String {
        format!(
            "[{} > {} > Row {}]",
            self.source_document, self.section, self.row_index
        )
    }
}

/// A knowledge entry retrieved for a question.
#[derive(Debug, Clone)]
pub struct EvidenceCandidate {
    pub entry: Arc<KnowledgeEntry>,

    /// Combined similarity, 0-100
    pub similarity: f64,

    /// Lexical similarity before concept re-ranking, 0-100
    pub lexical_score: f64,

    /// Share of the question's domain keywords found in the entry, 0-1
    pub concept_overlap: f64,

    /// 1-based rank within the match result
    pub rank: usize,
}

/// Ranked evidence for one question.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Candidates, best first
    pub candidates: Vec<EvidenceCandidate>,

    /// Knowledge domains detected in the question
    pub concepts: Vec<String>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self) -> Option<&EvidenceCandidate> {
        self.candidates.first()
    }

    /// Similarity of the best candidate, 0 when there is none.
    pub fn top_similarity(&self) -> f64 {
        self.top().map_or(0.0, |c| c.similarity)
    }
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    /// Provider draft that passed grounding
    Generated,
    /// Verbatim best evidence, no provider configured
    Extractive,
    /// Verbatim best evidence after a provider failure
    Degraded,
    /// Evidence missing or too weak
    Insufficient,
    /// Question concerns the operator's internal practices
    InternalMatter,
}

impl SynthesisMode {
    /// Modes that bypass scoring and always require a human.
    pub fn requires_human(&self) -> bool {
        matches!(self, SynthesisMode::Insufficient | SynthesisMode::InternalMatter)
    }
}

/// The synthesizer's output for one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesizedAnswer {
    pub answer_text: String,

    /// Citations in the order they support the answer
    pub citations: Vec<String>,

    /// Every statement is traceable to evidence
    pub grounded: bool,

    pub mode: SynthesisMode,

    /// Reviewer-facing explanation, set for non-generated modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SynthesizedAnswer {
    pub fn insufficient(note: impl Into<String>) -> Self {
        Self {
            answer_text: INSUFFICIENT_MARKER.to_string(),
            citations: Vec::new(),
            grounded: false,
            mode: SynthesisMode::Insufficient,
            note: Some(note.into()),
        }
    }

    pub fn internal_matter() -> Self {
        Self {
            answer_text: String::new(),
            citations: Vec::new(),
            grounded: false,
            mode: SynthesisMode::InternalMatter,
            note: Some(
                "Question concerns the operator's own internal practices; \
                 requires confirmation from the responsible team."
                    .to_string(),
            ),
        }
    }

    /// Verbatim answer of a single evidence entry.
    pub fn verbatim(entry: &KnowledgeEntry, mode: SynthesisMode, note: Option<String>) -> Self {
        Self {
            answer_text: entry.answer_text.clone(),
            citations: vec![entry.citation()],
            grounded: true,
            mode,
            note,
        }
    }
}

/// Confidence band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    #[serde(rename = "Requires Human Attention")]
    RequiresHumanAttention,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::RequiresHumanAttention => "Requires Human Attention",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scoring rule contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Adjustment {
    pub rule: String,
    pub delta: i32,
}

/// Scorer output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfidenceScore {
    pub base_score: i32,

    /// Non-zero rule contributions in evaluation order
    pub adjustments: Vec<Adjustment>,

    /// Clamped to 0-100
    pub final_score: u8,

    pub level: ConfidenceLevel,
}

/// One row of the filled questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FillRecord {
    pub question: String,
    pub answer: String,
    pub confidence_score: u8,
    pub confidence_level: ConfidenceLevel,
    pub evidence: String,
    pub similarity_score: f64,
}

impl FillRecord {
    /// Record for a question whose processing failed outright.
    pub fn failed(question: &str, reason: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: String::new(),
            confidence_score: 0,
            confidence_level: ConfidenceLevel::RequiresHumanAttention,
            evidence: format!("Processing failed: {}", reason),
            similarity_score: 0.0,
        }
    }
}

/// Per-level record counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub requires_human_attention: usize,
}

impl Summary {
    pub fn from_records(records: &[FillRecord]) -> Self {
        let mut summary = Summary::default();
        for record in records {
            match record.confidence_level {
                ConfidenceLevel::High => summary.high += 1,
                ConfidenceLevel::Medium => summary.medium += 1,
                ConfidenceLevel::Low => summary.low += 1,
                ConfidenceLevel::RequiresHumanAttention => summary.requires_human_attention += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.requires_human_attention
    }
}

/// Aggregate result of a fill request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FillResult {
    pub total_questions: usize,
    pub results: Vec<FillRecord>,
    pub csv_output: String,
    pub summary: Summary,
}

/// A question read from the input questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    /// Zero-based data row in the input file
    pub row_number: usize,
    pub question: String,
}

/// Knowledge base health, as reported by `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// `healthy`, `empty` or `unavailable`
    pub status: String,
    pub knowledge_base_entries: usize,
}

/// Knowledge base statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub total_entries: usize,

    /// Entry count per source document
    pub documents: BTreeMap<String, usize>,

    /// Distinct (document, section) pairs
    pub sections_count: usize,

    /// Terms in the combined question+answer vocabulary
    pub vocabulary_size: usize,

    /// SHA-256 over the loaded entries
    pub fingerprint: String,

    pub loaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> KnowledgeEntry {
        KnowledgeEntry {
            id: 0,
            source_document: "Compliance_Questionnaire".to_string(),
            section: "KYC".to_string(),
            row_index: 14,
            question_text: "Describe your KYC process".to_string(),
            answer_text: "We verify identity documents.".to_string(),
        }
    }

    #[test]
    fn test_citation_format() {
        assert_eq!(entry().citation(), "[Compliance_Questionnaire > KYC > Row 14]");
    }

    #[test]
    fn test_level_serialization() {
        let json = serde_json::to_string(&ConfidenceLevel::RequiresHumanAttention).unwrap();
        assert_eq!(json, "\"Requires Human Attention\"");
        assert_eq!(serde_json::to_string(&ConfidenceLevel::High).unwrap(), "\"High\"");
    }

    #[test]
    fn test_summary_counts() {
        let mut high = FillRecord::failed("q1", "x");
        high.confidence_level = ConfidenceLevel::High;
        let records = vec![high, FillRecord::failed("q2", "x"), FillRecord::failed("q3", "x")];

        let summary = Summary::from_records(&records);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.requires_human_attention, 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_verbatim_answer_cites_entry() {
        let answer = SynthesizedAnswer::verbatim(&entry(), SynthesisMode::Extractive, None);
        assert!(answer.grounded);
        assert_eq!(answer.citations, vec![entry().citation()]);
        assert!(!answer.mode.requires_human());
    }
}

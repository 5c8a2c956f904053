//! Grounding verification for generated answers.

use crate::text;
use crate::types::EvidenceCandidate;
use std::collections::HashSet;

/// Terms that carry no factual claim of their own.
const NEUTRAL_TERMS: &[&str] = &["yes", "correct", "indeed", "also"];

/// Outcome of checking a draft against its evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundingReport {
    /// Citations that exist in the evidence set, in draft order
    pub citations: Vec<String>,

    /// Sentences whose content terms are not sufficiently covered
    pub ungrounded_sentences: Vec<String>,
}

impl GroundingReport {
    pub fn is_grounded(&self) -> bool {
        self.ungrounded_sentences.is_empty() && !self.citations.is_empty()
    }
}

/// Checks that every sentence of a draft is traceable to the evidence.
#[derive(Debug, Clone)]
pub struct GroundingVerifier {
    threshold: f64,
}

impl GroundingVerifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn verify(
        &self,
        answer: &str,
        citations: &[String],
        evidence: &[EvidenceCandidate],
    ) -> GroundingReport {
        let known: HashSet<String> = evidence.iter().map(|c| c.entry.citation()).collect();

        let mut seen = HashSet::new();
        let citations: Vec<String> = citations
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| known.contains(c) && seen.insert(c.clone()))
            .collect();

        let mut vocabulary: HashSet<String> = HashSet::new();
        for candidate in evidence {
            vocabulary.extend(text::content_tokens(&candidate.entry.question_text));
            vocabulary.extend(text::content_tokens(&candidate.entry.answer_text));
        }

        let ungrounded_sentences = split_sentences(answer)
            .into_iter()
            .filter(|sentence| {
                let mut terms = text::content_tokens(sentence);
                terms.retain(|t| !NEUTRAL_TERMS.contains(&t.as_str()));
                if terms.is_empty() {
                    return false;
                }
                let covered = terms.iter().filter(|t| vocabulary.contains(*t)).count();
                (covered as f64 / terms.len() as f64) < self.threshold
            })
            .map(str::to_string)
            .collect();

        GroundingReport {
            citations,
            ungrounded_sentences,
        }
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

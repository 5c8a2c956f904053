//! Individual confidence rules.
//!
//! Each rule is a pure function of the question, its evidence and the
//! synthesized answer, returning a signed delta (0 when it does not apply).

use crate::text;
use crate::types::{MatchResult, SynthesisMode, SynthesizedAnswer};
use std::collections::BTreeSet;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub question: &'a str,
    pub evidence: &'a MatchResult,
    pub answer: &'a SynthesizedAnswer,
}

/// A named adjustment to the base confidence.
pub trait ScoringRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn delta(&self, input: &ScoringInput<'_>) -> i32;
}

/// Bonus when a domain keyword appears in both question and answer.
#[derive(Debug, Clone)]
pub struct DomainKeywordRule {
    pub keywords: Vec<String>,
    pub bonus: i32,
}

impl ScoringRule for DomainKeywordRule {
    fn name(&self) -> &'static str {
        "domain_keyword_match"
    }

    fn delta(&self, input: &ScoringInput<'_>) -> i32 {
        let matched = self.keywords.iter().any(|kw| {
            text::contains_term(input.question, kw) && text::contains_term(&input.answer.answer_text, kw)
        });
        if matched {
            self.bonus
        } else {
            0
        }
    }
}

/// Penalty for answers shorter than a character threshold.
#[derive(Debug, Clone)]
pub struct ShortAnswerRule {
    pub min_chars: usize,
    pub penalty: i32,
}

impl ScoringRule for ShortAnswerRule {
    fn name(&self) -> &'static str {
        "short_answer"
    }

    fn delta(&self, input: &ScoringInput<'_>) -> i32 {
        if input.answer.answer_text.trim().chars().count() < self.min_chars {
            self.penalty
        } else {
            0
        }
    }
}

/// Penalty when the two best candidates are too close to call.
#[derive(Debug, Clone)]
pub struct AmbiguityRule {
    pub margin: f64,
    pub penalty: i32,
}

impl ScoringRule for AmbiguityRule {
    fn name(&self) -> &'static str {
        "ambiguous_top_match"
    }

    fn delta(&self, input: &ScoringInput<'_>) -> i32 {
        match input.evidence.candidates.as_slice() {
            [first, second, ..] if first.similarity - second.similarity <= self.margin => self.penalty,
            _ => 0,
        }
    }
}

/// Bonus when the answer reuses enough of the question's significant terms.
#[derive(Debug, Clone)]
pub struct TermOverlapRule {
    /// Terms must be longer than this many characters
    pub min_term_chars: usize,
    pub min_shared: usize,
    pub bonus: i32,
}

impl ScoringRule for TermOverlapRule {
    fn name(&self) -> &'static str {
        "term_overlap"
    }

    fn delta(&self, input: &ScoringInput<'_>) -> i32 {
        let answer_terms: BTreeSet<String> = text::tokenize(&input.answer.answer_text)
            .into_iter()
            .collect();
        let shared = text::tokenize(input.question)
            .into_iter()
            .filter(|t| t.chars().count() > self.min_term_chars && !text::is_stop_word(t))
            .collect::<BTreeSet<_>>()
            .intersection(&answer_terms)
            .count();

        if shared >= self.min_shared {
            self.bonus
        } else {
            0
        }
    }
}

/// Penalty when synthesis fell back to verbatim evidence after a failure.
#[derive(Debug, Clone)]
pub struct DegradedSynthesisRule {
    pub penalty: i32,
}

impl ScoringRule for DegradedSynthesisRule {
    fn name(&self) -> &'static str {
        "degraded_synthesis"
    }

    fn delta(&self, input: &ScoringInput<'_>) -> i32 {
        if input.answer.mode == SynthesisMode::Degraded {
            self.penalty
        } else {
            0
        }
    }
}

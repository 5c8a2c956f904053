//! Confidence scoring.
//!
//! Base score is the best evidence similarity; an ordered cascade of named
//! rules adjusts it, the total is clamped to 0..=100 and mapped to a band.

mod rules;

pub use rules::{
    AmbiguityRule, DegradedSynthesisRule, DomainKeywordRule, ScoringInput, ScoringRule,
    ShortAnswerRule, TermOverlapRule,
};

use crate::config::{ConfidenceBands, EngineConfig, Vocabulary};
use crate::types::{Adjustment, ConfidenceLevel, ConfidenceScore};

const DOMAIN_KEYWORD_BONUS: i32 = 5;
const SHORT_ANSWER_PENALTY: i32 = -10;
const AMBIGUITY_PENALTY: i32 = -5;
const TERM_OVERLAP_BONUS: i32 = 5;

impl ConfidenceBands {
    /// Map a final score to its band.
    pub fn level_for(&self, score: u8) -> ConfidenceLevel {
        if score >= self.high {
            ConfidenceLevel::High
        } else if score >= self.medium {
            ConfidenceLevel::Medium
        } else if score >= self.low {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::RequiresHumanAttention
        }
    }
}

/// Applies the rule cascade and banding.
pub struct ConfidenceScorer {
    rules: Vec<Box<dyn ScoringRule>>,
    bands: ConfidenceBands,
}

impl ConfidenceScorer {
    pub fn new(rules: Vec<Box<dyn ScoringRule>>, bands: ConfidenceBands) -> Self {
        Self { rules, bands }
    }

    /// The standard cascade, in evaluation order.
    pub fn from_config(config: &EngineConfig, vocabulary: &Vocabulary) -> Self {
        let rules: Vec<Box<dyn ScoringRule>> = vec![
            Box::new(DomainKeywordRule {
                keywords: vocabulary.domain_keywords.clone(),
                bonus: DOMAIN_KEYWORD_BONUS,
            }),
            Box::new(ShortAnswerRule {
                min_chars: config.short_answer_chars,
                penalty: SHORT_ANSWER_PENALTY,
            }),
            Box::new(AmbiguityRule {
                margin: config.ambiguity_margin,
                penalty: AMBIGUITY_PENALTY,
            }),
            Box::new(TermOverlapRule {
                min_term_chars: 4,
                min_shared: 3,
                bonus: TERM_OVERLAP_BONUS,
            }),
            Box::new(DegradedSynthesisRule {
                penalty: config.degraded_penalty,
            }),
        ];

        Self::new(rules, config.bands)
    }

    pub fn bands(&self) -> &ConfidenceBands {
        &self.bands
    }

    /// Score an answer.
    ///
    /// Insufficient-evidence and internal-matter answers skip the cascade and
    /// always score 0 / RequiresHumanAttention.
    pub fn score(&self, input: &ScoringInput<'_>) -> ConfidenceScore {
        if input.answer.mode.requires_human() {
            return ConfidenceScore {
                base_score: 0,
                adjustments: Vec::new(),
                final_score: 0,
                level: ConfidenceLevel::RequiresHumanAttention,
            };
        }

        let base_score = input.evidence.top_similarity().round() as i32;

        let adjustments: Vec<Adjustment> = self
            .rules
            .iter()
            .map(|rule| (rule.name(), rule.delta(input)))
            .filter(|(_, delta)| *delta != 0)
            .map(|(rule, delta)| Adjustment {
                rule: rule.to_string(),
                delta,
            })
            .collect();

        let total = base_score + adjustments.iter().map(|a| a.delta).sum::<i32>();
        let final_score = total.clamp(0, 100) as u8;

        ConfidenceScore {
            base_score,
            adjustments,
            final_score,
            level: self.bands.level_for(final_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EvidenceCandidate, KnowledgeEntry, MatchResult, SynthesisMode, SynthesizedAnswer};
    use std::sync::Arc;

    fn candidate(id: usize, similarity: f64, answer: &str) -> EvidenceCandidate {
        EvidenceCandidate {
            entry: Arc::new(KnowledgeEntry {
                id,
                source_document: "Compliance_DDQ".to_string(),
                section: "Onboarding".to_string(),
                row_index: id as u32 + 2,
                question_text: String::new(),
                answer_text: answer.to_string(),
            }),
            similarity,
            lexical_score: similarity,
            concept_overlap: 0.0,
            rank: id + 1,
        }
    }

    fn answer(text: &str, mode: SynthesisMode) -> SynthesizedAnswer {
        SynthesizedAnswer {
            answer_text: text.to_string(),
            citations: Vec::new(),
            grounded: true,
            mode,
            note: None,
        }
    }

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::from_config(&EngineConfig::default(), &Vocabulary::default())
    }

    #[test]
    fn test_kyc_domain_bonus_reaches_high() {
        let text = "Our KYC procedure verifies identity documents and screens every customer.";
        let evidence = MatchResult { candidates: vec![candidate(0, 92.0, text)], concepts: vec![] };
        let a = answer(text, SynthesisMode::Extractive);

        let score = scorer().score(&ScoringInput {
            question: "What is your KYC process?",
            evidence: &evidence,
            answer: &a,
        });

        assert_eq!(score.base_score, 92);
        assert_eq!(
            score.adjustments,
            vec![Adjustment { rule: "domain_keyword_match".to_string(), delta: 5 }]
        );
        assert_eq!(score.final_score, 97);
        assert_eq!(score.level, ConfidenceLevel::High);
    }

    #[test]
    fn test_ambiguous_match_drops_to_medium() {
        let text = "Reports are delivered to the operations desk every morning by email.";
        let evidence = MatchResult {
            candidates: vec![candidate(0, 80.0, text), candidate(1, 78.0, "Other reports.")],
            concepts: vec![],
        };
        let a = answer(text, SynthesisMode::Extractive);

        let score = scorer().score(&ScoringInput {
            question: "When do reports arrive?",
            evidence: &evidence,
            answer: &a,
        });

        assert_eq!(score.final_score, 75);
        assert_eq!(score.level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_review_modes_force_zero() {
        let evidence = MatchResult { candidates: vec![candidate(0, 99.0, "x")], concepts: vec![] };
        for a in [SynthesizedAnswer::internal_matter(), SynthesizedAnswer::insufficient("none")] {
            let score = scorer().score(&ScoringInput { question: "q", evidence: &evidence, answer: &a });
            assert_eq!(score.final_score, 0);
            assert_eq!(score.level, ConfidenceLevel::RequiresHumanAttention);
            assert!(score.adjustments.is_empty());
        }
    }

    #[test]
    fn test_score_is_clamped() {
        let text = "Short.";
        let evidence = MatchResult {
            candidates: vec![candidate(0, 12.0, text), candidate(1, 11.0, text)],
            concepts: vec![],
        };
        let a = answer(text, SynthesisMode::Degraded);

        let score = scorer().score(&ScoringInput { question: "q", evidence: &evidence, answer: &a });
        // 12 - 10 - 5 - 10
        assert_eq!(score.final_score, 0);
        assert_eq!(score.level, ConfidenceLevel::RequiresHumanAttention);
    }

    #[test]
    fn test_band_boundaries() {
        let bands = ConfidenceBands::default();
        assert_eq!(bands.level_for(100), ConfidenceLevel::High);
        assert_eq!(bands.level_for(90), ConfidenceLevel::High);
        assert_eq!(bands.level_for(89), ConfidenceLevel::Medium);
        assert_eq!(bands.level_for(70), ConfidenceLevel::Medium);
        assert_eq!(bands.level_for(69), ConfidenceLevel::Low);
        assert_eq!(bands.level_for(40), ConfidenceLevel::Low);
        assert_eq!(bands.level_for(39), ConfidenceLevel::RequiresHumanAttention);
        assert_eq!(bands.level_for(0), ConfidenceLevel::RequiresHumanAttention);
    }
}

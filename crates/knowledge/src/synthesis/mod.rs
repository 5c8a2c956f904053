//! Grounded answer synthesis.
//!
//! The synthesizer turns ranked evidence into an answer:
//! 1. internal-matter questions are routed to a human
//! 2. missing or weak evidence yields the insufficient-information marker
//! 3. with no provider configured, the best evidence is returned verbatim
//! 4. otherwise the provider drafts an answer, which must pass grounding;
//!    any provider failure, timeout or ungrounded draft falls back to the
//!    best evidence verbatim, marked degraded

mod grounding;
mod internal;
mod provider;

pub use grounding::{GroundingReport, GroundingVerifier};
pub use internal::InternalMatterDetector;
pub use provider::{parse_draft, Draft, LlmSynthesisProvider, SynthesisProvider};

use crate::types::{MatchResult, SynthesisMode, SynthesizedAnswer, INSUFFICIENT_MARKER};
use autofill_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Produces grounded answers from evidence.
pub struct Synthesizer {
    provider: Option<Arc<dyn SynthesisProvider>>,
    detector: InternalMatterDetector,
    verifier: GroundingVerifier,
    min_similarity: f64,
    timeout: Duration,
}

impl Synthesizer {
    pub fn new(
        provider: Option<Arc<dyn SynthesisProvider>>,
        detector: InternalMatterDetector,
        verifier: GroundingVerifier,
        min_similarity: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            detector,
            verifier,
            min_similarity,
            timeout,
        }
    }

    /// Name of the configured provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Synthesize an answer. Never fails: provider errors degrade the answer.
    pub async fn synthesize(&self, question: &str, evidence: &MatchResult) -> SynthesizedAnswer {
        if self.detector.is_internal_matter(question) {
            tracing::debug!("Internal-matter question routed to review: {}", question);
            return SynthesizedAnswer::internal_matter();
        }

        let top = match evidence.top() {
            Some(top) => top,
            None => {
                return SynthesizedAnswer::insufficient("No relevant evidence found in the knowledge base.")
            }
        };

        if top.similarity < self.min_similarity {
            return SynthesizedAnswer::insufficient(format!(
                "Best evidence similarity {:.1} is below the {:.0} minimum.",
                top.similarity, self.min_similarity
            ));
        }

        let provider = match &self.provider {
            Some(provider) => provider,
            None => return SynthesizedAnswer::verbatim(&top.entry, SynthesisMode::Extractive, None),
        };

        match self.generate(provider.as_ref(), question, evidence).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    "Synthesis failed, using best evidence verbatim: {}",
                    e
                );
                SynthesizedAnswer::verbatim(
                    &top.entry,
                    SynthesisMode::Degraded,
                    Some(format!("Synthesis unavailable ({}); best evidence used verbatim.", e)),
                )
            }
        }
    }

    async fn generate(
        &self,
        provider: &dyn SynthesisProvider,
        question: &str,
        evidence: &MatchResult,
    ) -> AppResult<SynthesizedAnswer> {
        let draft = tokio::time::timeout(self.timeout, provider.generate(question, &evidence.candidates))
            .await
            .map_err(|_| {
                AppError::Synthesis(format!("timed out after {}s", self.timeout.as_secs_f64()))
            })??;

        if draft.answer.trim() == INSUFFICIENT_MARKER {
            return Ok(SynthesizedAnswer::insufficient(
                "Synthesis provider reported the evidence does not answer the question.",
            ));
        }

        let report = self.verifier.verify(&draft.answer, &draft.citations, &evidence.candidates);
        if !report.is_grounded() {
            let reason = if report.citations.is_empty() {
                "draft cites no supplied evidence".to_string()
            } else {
                format!(
                    "draft contains unsupported statements: {}",
                    report.ungrounded_sentences.join(" | ")
                )
            };
            return Err(AppError::Synthesis(reason));
        }

        Ok(SynthesizedAnswer {
            answer_text: draft.answer.trim().to_string(),
            citations: report.citations,
            grounded: true,
            mode: SynthesisMode::Generated,
            note: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InternalMatterConfig;
    use crate::types::{EvidenceCandidate, KnowledgeEntry};
    use async_trait::async_trait;

    struct FixedProvider(AppResult<Draft>);

    #[async_trait]
    impl SynthesisProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _: &str, _: &[EvidenceCandidate]) -> AppResult<Draft> {
            match &self.0 {
                Ok(draft) => Ok(draft.clone()),
                Err(e) => Err(AppError::Llm(e.to_string())),
            }
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl SynthesisProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _: &str, _: &[EvidenceCandidate]) -> AppResult<Draft> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(AppError::Synthesis("unreachable".to_string()))
        }
    }

    fn evidence(similarity: f64) -> MatchResult {
        MatchResult {
            candidates: vec![EvidenceCandidate {
                entry: Arc::new(KnowledgeEntry {
                    id: 0,
                    source_document: "Custody_DDQ".to_string(),
                    section: "Wallets".to_string(),
                    row_index: 5,
                    question_text: "How are client assets segregated?".to_string(),
                    answer_text: "Client assets are held in segregated wallets per client.".to_string(),
                }),
                similarity,
                lexical_score: similarity,
                concept_overlap: 0.0,
                rank: 1,
            }],
            concepts: Vec::new(),
        }
    }

    fn citation() -> String {
        "[Custody_DDQ > Wallets > Row 5]".to_string()
    }

    fn synthesizer(provider: Option<Arc<dyn SynthesisProvider>>) -> Synthesizer {
        Synthesizer::new(
            provider,
            InternalMatterDetector::new(&InternalMatterConfig::default()).unwrap(),
            GroundingVerifier::new(0.8),
            40.0,
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_extractive_without_provider() {
        let answer = synthesizer(None)
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Extractive);
        assert_eq!(answer.answer_text, "Client assets are held in segregated wallets per client.");
        assert_eq!(answer.citations, vec![citation()]);
        assert!(answer.grounded);
    }

    #[tokio::test]
    async fn test_weak_or_missing_evidence_is_insufficient() {
        let s = synthesizer(None);

        let answer = s.synthesize("Anything", &MatchResult::default()).await;
        assert_eq!(answer.mode, SynthesisMode::Insufficient);
        assert_eq!(answer.answer_text, INSUFFICIENT_MARKER);

        let answer = s.synthesize("Anything", &evidence(39.9)).await;
        assert_eq!(answer.mode, SynthesisMode::Insufficient);
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_internal_matter_bypasses_evidence() {
        let answer = synthesizer(None)
            .synthesize("What internal authentication system does the bank itself use?", &evidence(95.0))
            .await;
        assert_eq!(answer.mode, SynthesisMode::InternalMatter);
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_grounded_draft_is_generated() {
        let provider = FixedProvider(Ok(Draft {
            answer: "Client assets are held in segregated wallets.".to_string(),
            citations: vec![citation(), "[Made > Up > Row 1]".to_string()],
        }));
        let answer = synthesizer(Some(Arc::new(provider)))
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Generated);
        assert_eq!(answer.citations, vec![citation()]);
        assert!(answer.grounded);
    }

    #[tokio::test]
    async fn test_provider_error_degrades() {
        let provider = FixedProvider(Err(AppError::Llm("rate limited".to_string())));
        let answer = synthesizer(Some(Arc::new(provider)))
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Degraded);
        assert_eq!(answer.answer_text, "Client assets are held in segregated wallets per client.");
        assert!(answer.grounded);
        assert!(answer.note.unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_ungrounded_draft_degrades() {
        let provider = FixedProvider(Ok(Draft {
            answer: "Assets sit in a Swiss vault insured by Lloyd's.".to_string(),
            citations: vec![citation()],
        }));
        let answer = synthesizer(Some(Arc::new(provider)))
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Degraded);
        assert_eq!(answer.citations, vec![citation()]);
    }

    #[tokio::test]
    async fn test_timeout_degrades() {
        let answer = synthesizer(Some(Arc::new(SlowProvider)))
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Degraded);
        assert!(answer.note.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_insufficient_marker_from_provider_is_honored() {
        let provider = FixedProvider(Ok(Draft {
            answer: INSUFFICIENT_MARKER.to_string(),
            citations: Vec::new(),
        }));
        let answer = synthesizer(Some(Arc::new(provider)))
            .synthesize("How do you segregate client assets?", &evidence(85.0))
            .await;

        assert_eq!(answer.mode, SynthesisMode::Insufficient);
    }
}

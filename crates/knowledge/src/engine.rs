//! Batch orchestration: match, synthesize and score every question.

use crate::config::{EngineConfig, Vocabulary};
use crate::index::KnowledgeIndex;
use crate::matcher::ConceptMatcher;
use crate::output::render_csv;
use crate::progress::ProgressReporter;
use crate::scoring::{ConfidenceScorer, ScoringInput};
use crate::synthesis::{GroundingVerifier, InternalMatterDetector, SynthesisProvider, Synthesizer};
use crate::types::{
    ConfidenceScore, FillRecord, FillResult, MatchResult, QuestionRow, Summary, SynthesizedAnswer,
};
use autofill_core::AppResult;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Matcher, synthesizer and scorer, built once and shared by all requests.
pub struct Pipeline {
    matcher: ConceptMatcher,
    synthesizer: Synthesizer,
    scorer: ConfidenceScorer,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(
        config: &EngineConfig,
        vocabulary: &Vocabulary,
        provider: Option<Arc<dyn SynthesisProvider>>,
    ) -> AppResult<Self> {
        config.validate()?;

        let synthesizer = Synthesizer::new(
            provider,
            InternalMatterDetector::new(&vocabulary.internal_matter)?,
            GroundingVerifier::new(config.grounding_threshold),
            config.min_similarity,
            Duration::from_secs(config.synthesis_timeout_secs),
        );

        Ok(Self {
            matcher: ConceptMatcher::new(vocabulary, config.top_k, config.candidate_pool),
            synthesizer,
            scorer: ConfidenceScorer::from_config(config, vocabulary),
            concurrency: config.concurrency,
        })
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.synthesizer.provider_name()
    }
}

/// One request's view of the engine: a pipeline bound to an index snapshot.
#[derive(Clone)]
pub struct FillEngine {
    index: Arc<KnowledgeIndex>,
    pipeline: Arc<Pipeline>,
}

impl FillEngine {
    pub fn new(index: Arc<KnowledgeIndex>, pipeline: Arc<Pipeline>) -> Self {
        Self { index, pipeline }
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    /// Answer a single question. Never fails; problems degrade the record.
    pub async fn answer(&self, question: &str) -> FillRecord {
        match AssertUnwindSafe(self.process(question)).catch_unwind().await {
            Ok(record) => record,
            Err(_) => {
                tracing::error!("Processing panicked for question: {}", question);
                FillRecord::failed(question, "internal error while answering")
            }
        }
    }

    async fn process(&self, question: &str) -> FillRecord {
        let evidence = self.pipeline.matcher.match_question(&self.index, question);
        let answer = self.pipeline.synthesizer.synthesize(question, &evidence).await;
        let score = self.pipeline.scorer.score(&ScoringInput {
            question,
            evidence: &evidence,
            answer: &answer,
        });

        tracing::debug!(
            question = %question,
            mode = ?answer.mode,
            base = score.base_score,
            adjustments = ?score.adjustments,
            final_score = score.final_score,
            level = %score.level,
            "Scored question"
        );

        build_record(question, &evidence, &answer, &score)
    }

    /// Answer every question, preserving input order.
    ///
    /// Questions run concurrently up to the configured limit; each finished
    /// question emits a progress event. The output has exactly one record per
    /// input question.
    pub async fn fill(
        &self,
        questions: &[QuestionRow],
        reporter: &ProgressReporter,
    ) -> AppResult<FillResult> {
        let total = questions.len();
        tracing::info!(
            "Filling {} questions against {} entries (concurrency {}, provider {})",
            total,
            self.index.len(),
            self.pipeline.concurrency,
            self.pipeline.provider_name().unwrap_or("none")
        );

        let mut slots: Vec<Option<FillRecord>> = vec![None; total];
        let mut done = 0;

        let mut pending = stream::iter(questions.iter().enumerate())
            .map(|(position, row)| async move { (position, self.answer(&row.question).await) })
            .buffer_unordered(self.pipeline.concurrency.max(1));

        while let Some((position, record)) = pending.next().await {
            slots[position] = Some(record);
            done += 1;
            reporter.question_done(done, total);
        }

        let results: Vec<FillRecord> = slots
            .into_iter()
            .zip(questions)
            .map(|(slot, row)| {
                slot.unwrap_or_else(|| FillRecord::failed(&row.question, "no result produced"))
            })
            .collect();

        reporter.generating();
        let csv_output = render_csv(&results)?;
        let summary = Summary::from_records(&results);

        tracing::info!(
            "Fill complete: {} high, {} medium, {} low, {} need review",
            summary.high,
            summary.medium,
            summary.low,
            summary.requires_human_attention
        );

        Ok(FillResult {
            total_questions: total,
            results,
            csv_output,
            summary,
        })
    }
}

fn build_record(
    question: &str,
    evidence: &MatchResult,
    answer: &SynthesizedAnswer,
    score: &ConfidenceScore,
) -> FillRecord {
    let mut evidence_text = answer.citations.join("; ");
    if let Some(note) = &answer.note {
        if !evidence_text.is_empty() {
            evidence_text.push(' ');
        }
        evidence_text.push_str(note);
    }

    FillRecord {
        question: question.to_string(),
        answer: answer.answer_text.clone(),
        confidence_score: score.final_score,
        confidence_level: score.level,
        evidence: evidence_text,
        similarity_score: (evidence.top_similarity() * 100.0).round() / 100.0,
    }
}

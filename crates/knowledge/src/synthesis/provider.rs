//! Text-generation providers for answer synthesis.

use crate::types::{EvidenceCandidate, INSUFFICIENT_MARKER};
use async_trait::async_trait;
use autofill_core::{AppError, AppResult};
use autofill_llm::{LlmClient, LlmRequest};
use autofill_prompt::{build_prompt, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A provider's proposed answer, not yet verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Generates a draft answer from ranked evidence.
///
/// Implementations may be slow, rate-limited or non-deterministic. Callers
/// verify every draft before using it.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, question: &str, evidence: &[EvidenceCandidate]) -> AppResult<Draft>;
}

#[derive(Serialize)]
struct EvidenceContext {
    rank: usize,
    citation: String,
    question: String,
    answer: String,
}

#[derive(Serialize)]
struct PromptContext<'a> {
    question: &'a str,
    insufficient_marker: &'a str,
    evidence: Vec<EvidenceContext>,
}

/// Completion budget for one synthesized answer.
const SYNTHESIS_MAX_TOKENS: u32 = 600;

/// Synthesis backed by an LLM client and a Handlebars prompt.
pub struct LlmSynthesisProvider {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl LlmSynthesisProvider {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }
}

#[async_trait]
impl SynthesisProvider for LlmSynthesisProvider {
    fn name(&self) -> &str {
        self.client.provider_name()
    }

    async fn generate(&self, question: &str, evidence: &[EvidenceCandidate]) -> AppResult<Draft> {
        let context = PromptContext {
            question,
            insufficient_marker: INSUFFICIENT_MARKER,
            evidence: evidence
                .iter()
                .map(|c| EvidenceContext {
                    rank: c.rank,
                    citation: c.entry.citation(),
                    question: c.entry.question_text.clone(),
                    answer: c.entry.answer_text.clone(),
                })
                .collect(),
        };

        let built = build_prompt(&self.prompt, &context)?;

        let mut request = LlmRequest::new(built.user, &self.model)
            .with_max_tokens(SYNTHESIS_MAX_TOKENS)
            .with_temperature(0.0);
        if built.json_output {
            request = request.with_json_output();
        }
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        tracing::trace!("Synthesis response: {}", response.content);

        parse_draft(&response.content)
    }
}

/// Parse a provider reply into a draft.
///
/// Models sometimes wrap the JSON object in prose or code fences, so the
/// outermost `{...}` span is used.
pub fn parse_draft(content: &str) -> AppResult<Draft> {
    let start = content.find('{');
    let end = content.rfind('}');

    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => {
            return Err(AppError::Synthesis(
                "Provider reply contains no JSON object".to_string(),
            ))
        }
    };

    let draft: Draft = serde_json::from_str(json)
        .map_err(|e| AppError::Synthesis(format!("Malformed provider reply: {}", e)))?;

    if draft.answer.trim().is_empty() {
        return Err(AppError::Synthesis("Provider returned an empty answer".to_string()));
    }

    Ok(draft)
}

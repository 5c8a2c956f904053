//! Built-in prompt definitions.

use crate::types::{PromptDefinition, PromptOutputSpec};

/// Identifier of the grounded answer synthesis prompt.
pub const SYNTHESIS_PROMPT_ID: &str = "synthesis.answer";

const SYNTHESIS_SYSTEM: &str = "You complete vendor due-diligence questionnaires for a regulated \
institution. The EVIDENCE entries below are the only source of truth.

Rules:
1. Use only statements that appear in the evidence. Prefer the evidence wording; \
rephrase only to fit the question. Never add facts, numbers, product names or \
commitments that the evidence does not contain.
2. If the evidence does not answer the question, set \"answer\" to exactly \
\"{{insufficient_marker}}\" and return an empty citation list.
3. Cite every evidence entry you used, copying its citation string exactly.
4. When evidence entries disagree, use the one that addresses the question most \
directly.

Respond with a single JSON object and nothing else:
{\"answer\": \"string\", \"citations\": [\"[Document > Section > Row N]\"]}";

const SYNTHESIS_TEMPLATE: &str = "Question: {{question}}

EVIDENCE:
{{#each evidence}}
--- Entry {{this.rank}} ---
citation: {{this.citation}}
original question: {{this.question}}
answer: {{this.answer}}
{{/each}}";

/// The built-in grounded synthesis prompt.
///
/// Expects a context with `question`, `insufficient_marker` and an `evidence`
/// array of `{rank, citation, question, answer}` objects.
pub fn synthesis_prompt() -> PromptDefinition {
    PromptDefinition {
        id: SYNTHESIS_PROMPT_ID.to_string(),
        title: "Grounded questionnaire answer".to_string(),
        api_version: "1.0".to_string(),
        system: Some(SYNTHESIS_SYSTEM.to_string()),
        template: SYNTHESIS_TEMPLATE.to_string(),
        output: PromptOutputSpec {
            format: "json".to_string(),
        },
    }
}

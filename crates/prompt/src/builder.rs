//! Prompt builder for rendering templates against structured context.

use crate::types::{BuiltPrompt, PromptDefinition};
use autofill_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Render a prompt definition against a serializable context.
///
/// Both the system and user templates are rendered with the same context.
/// HTML escaping is disabled since the output goes to an LLM, not a browser.
///
/// # Example
/// ```no_run
/// use autofill_prompt::{build_prompt, synthesis_prompt};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let context = serde_json::json!({ "question": "Do you support SSO?", "evidence": [] });
/// let built = build_prompt(&synthesis_prompt(), &context)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt<C: Serialize>(definition: &PromptDefinition, context: &C) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("user", &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    if let Some(system) = &definition.system {
        handlebars
            .register_template_string("system", system)
            .map_err(|e| AppError::Prompt(format!("Failed to register system template: {}", e)))?;
    }

    let user = handlebars
        .render("user", context)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    let system = if definition.system.is_some() {
        Some(
            handlebars
                .render("system", context)
                .map_err(|e| AppError::Prompt(format!("Failed to render system template: {}", e)))?,
        )
    } else {
        None
    };

    Ok(BuiltPrompt {
        system,
        user,
        source_prompt_id: definition.id.clone(),
        json_output: definition.output.is_json(),
    })
}

//! Prompt system for answer synthesis.
//!
//! This crate provides:
//! - YAML-based prompt definitions (overridable per workspace)
//! - Handlebars template rendering over structured evidence
//! - The built-in grounded-synthesis prompt

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{synthesis_prompt, SYNTHESIS_PROMPT_ID};
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, PromptDefinition, PromptOutputSpec};

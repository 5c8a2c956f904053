//! Prompt loader for workspace prompt overrides.
//!
//! Prompts live in `.autofill/prompts/<id>.yml`. A workspace file with the same
//! id as a built-in prompt replaces it.

use crate::defaults::{synthesis_prompt, SYNTHESIS_PROMPT_ID};
use crate::types::PromptDefinition;
use autofill_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".autofill").join("prompts")
}

/// Load a prompt definition by ID from the workspace.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", prompt_file, e))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", prompt_file, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve a prompt: workspace override if present, otherwise the built-in definition.
pub fn resolve_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let override_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));
    if override_file.exists() {
        return load_prompt(workspace_path, prompt_id);
    }

    match prompt_id {
        SYNTHESIS_PROMPT_ID => Ok(synthesis_prompt()),
        other => Err(AppError::Prompt(format!("Unknown prompt: {}", other))),
    }
}

/// List all prompt override IDs in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids: Vec<String> = walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("yml"))
        .filter_map(|e| e.path().file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt("Prompt template cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) {
        let prompts = prompts_dir(dir);
        fs::create_dir_all(&prompts).unwrap();
        fs::write(prompts.join(format!("{}.yml", id)), body).unwrap();
    }

    fn valid_body(id: &str) -> String {
        format!(
            "id: {}\ntitle: Override\napiVersion: \"1.0\"\ntemplate: \"Q: {{{{question}}}}\"\noutput:\n  format: json\n",
            id
        )
    }

    #[test]
    fn test_resolve_builtin_without_override() {
        let temp = TempDir::new().unwrap();
        let def = resolve_prompt(temp.path(), SYNTHESIS_PROMPT_ID).unwrap();
        assert_eq!(def.id, SYNTHESIS_PROMPT_ID);
        assert!(def.system.is_some());
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp = TempDir::new().unwrap();
        write_prompt(temp.path(), SYNTHESIS_PROMPT_ID, &valid_body(SYNTHESIS_PROMPT_ID));

        let def = resolve_prompt(temp.path(), SYNTHESIS_PROMPT_ID).unwrap();
        assert_eq!(def.title, "Override");
        assert_eq!(def.template, "Q: {{question}}");
    }

    #[test]
    fn test_unknown_prompt() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_prompt(temp.path(), "nope").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        write_prompt(temp.path(), "broken", "invalid: yaml: content:");
        assert!(load_prompt(temp.path(), "broken").is_err());
    }

    #[test]
    fn test_bad_api_version() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "v",
            "id: v\ntitle: V\napiVersion: \"1\"\ntemplate: x\noutput:\n  format: text\n",
        );
        assert!(load_prompt(temp.path(), "v").is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp = TempDir::new().unwrap();
        write_prompt(temp.path(), "b", &valid_body("b"));
        write_prompt(temp.path(), "a", &valid_body("a"));

        assert_eq!(list_prompts(temp.path()).unwrap(), vec!["a", "b"]);
    }
}

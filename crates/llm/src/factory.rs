//! LLM provider factory.
//!
//! Resolves a provider name into a shared client. `none` resolves to no client,
//! which keeps answer synthesis purely extractive.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use autofill_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Default HTTP timeout applied when the provider config does not set one.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("none", "ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required for OpenAI
/// * `timeout_secs` - Optional HTTP timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<Option<Arc<dyn LlmClient>>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;
    let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS));

    match provider_type {
        ProviderType::None => Ok(None),
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_BASE_URL);
            let client = OllamaClient::with_base_url(base_url).with_timeout(timeout)?;
            Ok(Some(Arc::new(client)))
        }
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(crate::providers::openai::DEFAULT_BASE_URL);
            let client = OpenAiClient::new(base_url, api_key).with_timeout(timeout)?;
            Ok(Some(Arc::new(client)))
        }
    }
}

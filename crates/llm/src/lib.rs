//! LLM integration crate for the autofill engine.
//!
//! Provides a provider-agnostic completion interface used by the answer
//! synthesizer. Responses are treated as untrusted drafts; grounding is
//! enforced by the caller.
//!
//! # Providers
//! - **Ollama**: local runtime
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint
//!
//! # Example
//! ```no_run
//! use autofill_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Reply with {}", "llama3.2").with_json_output();
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;

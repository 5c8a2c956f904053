//! Ask command handler.
//!
//! Answers one question against the knowledge base.

use super::open_service;
use autofill_core::{config::AppConfig, AppResult};
use clap::Args;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Question: {}", self.question);

        let service = open_service(config)?;
        let record = service.answer(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            println!("{}", record.answer);
            println!();
            println!(
                "Confidence: {} ({})",
                record.confidence_score, record.confidence_level
            );
            println!("Similarity: {:.2}", record.similarity_score);
            if !record.evidence.is_empty() {
                println!("Evidence:   {}", record.evidence);
            }
        }

        Ok(())
    }
}

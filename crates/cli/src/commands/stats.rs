//! Stats command handler.
//!
//! Handles knowledge base statistics display.

use super::open_service;
use autofill_core::{config::AppConfig, AppResult};
use clap::Args;

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let service = open_service(config)?;
        let stats = service.stats()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Knowledge base: {:?}", service.workspace());
        println!("  Entries:     {}", stats.total_entries);
        println!("  Sections:    {}", stats.sections_count);
        println!("  Vocabulary:  {} terms", stats.vocabulary_size);
        println!("  Fingerprint: {}", stats.fingerprint);
        println!("  Loaded at:   {}", stats.loaded_at.to_rfc3339());
        if !stats.documents.is_empty() {
            println!("  Documents:");
            for (document, count) in &stats.documents {
                println!("    {:<40} {}", document, count);
            }
        }

        Ok(())
    }
}

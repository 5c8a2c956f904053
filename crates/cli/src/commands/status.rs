//! Status command handler.

use super::open_service;
use autofill_core::{config::AppConfig, AppResult};
use clap::Args;

/// Show knowledge base health
#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");

        let service = open_service(config)?;
        println!("{}", serde_json::to_string(&service.status())?);

        Ok(())
    }
}

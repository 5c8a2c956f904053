//! Command handlers for the autofill CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod fill;
pub mod stats;
pub mod status;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use fill::FillCommand;
pub use stats::StatsCommand;
pub use status::StatusCommand;

use autofill_core::{config::AppConfig, AppResult};
use autofill_knowledge::{provider_from_config, AutofillService};

/// Open the workspace service and load its knowledge base.
pub(crate) fn open_service(config: &AppConfig) -> AppResult<AutofillService> {
    let provider = provider_from_config(config)?;
    let service = AutofillService::open(&config.workspace, provider)?;
    service.reload()?;
    Ok(service)
}

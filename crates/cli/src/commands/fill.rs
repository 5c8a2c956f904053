//! Fill command handler.
//!
//! Streams progress and the filled CSV to stdout, or prints the aggregate as JSON.

use super::open_service;
use autofill_core::{config::AppConfig, AppError, AppResult};
use autofill_knowledge::{forward, stream_fill, ProgressEvent, ProgressReporter};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fill a questionnaire CSV
#[derive(Args, Debug)]
pub struct FillCommand {
    /// Questionnaire CSV to fill
    pub questionnaire: PathBuf,

    /// Print the aggregate result as JSON instead of streaming
    #[arg(long)]
    pub json: bool,

    /// Also write the filled CSV to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FillCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing fill command for {:?}", self.questionnaire);

        let content = tokio::fs::read(&self.questionnaire).await.map_err(|e| {
            AppError::Input(format!("Failed to read {:?}: {}", self.questionnaire, e))
        })?;
        let filename = file_name(&self.questionnaire);
        let service = open_service(config)?;

        let csv = if self.json {
            let reporter = ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                tracing::info!("{}", event.format_simple());
            }));
            let result = service.fill(&filename, &content, &reporter).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Some(result.csv_output)
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            let writer = tokio::spawn(async move {
                let mut stdout = tokio::io::stdout();
                forward(rx, &mut stdout).await
            });

            let streamed = stream_fill(&service, &filename, &content, tx).await;
            let body = writer
                .await
                .map_err(|e| AppError::Other(format!("Output task failed: {}", e)))??;
            streamed?;
            body
        };

        if let (Some(path), Some(csv)) = (&self.output, csv) {
            tokio::fs::write(path, csv).await?;
            tracing::info!("Wrote filled questionnaire to {:?}", path);
        }

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("questionnaire.csv")
        .to_string()
}

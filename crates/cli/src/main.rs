//! Autofill CLI
//!
//! Main entry point for the autofill command-line tool.
//! Fills security and due-diligence questionnaires from previously answered ones.

mod commands;

use autofill_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{AskCommand, FillCommand, StatsCommand, StatusCommand};
use std::path::PathBuf;
use tracing::Instrument;

/// Autofill - answer questionnaires from your knowledge base
#[derive(Parser, Debug)]
#[command(name = "autofill")]
#[command(about = "Answer questionnaires from previously answered ones", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "AUTOFILL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "AUTOFILL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Synthesis provider (none, ollama, openai)
    #[arg(short, long, global = true, env = "AUTOFILL_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "AUTOFILL_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill a questionnaire CSV
    Fill(FillCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Show knowledge base health
    Status(StatusCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Resolve workspace and config file first so the right config.yaml is merged
    let config = AppConfig::load_with(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Logs go to stderr; stdout is reserved for command output
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Autofill CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Fill(_) => "fill",
        Commands::Ask(_) => "ask",
        Commands::Status(_) => "status",
        Commands::Stats(_) => "stats",
    };
    let span = tracing::info_span!("command", name = command_name);

    let result = async {
        match cli.command {
            Commands::Fill(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Status(cmd) => cmd.execute(&config).await,
            Commands::Stats(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill_with_global_flags() {
        let cli = Cli::try_parse_from([
            "autofill",
            "fill",
            "vendor.csv",
            "--json",
            "--provider",
            "ollama",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(cli.verbose);
        match cli.command {
            Commands::Fill(cmd) => {
                assert_eq!(cmd.questionnaire, PathBuf::from("vendor.csv"));
                assert!(cmd.json);
                assert!(cmd.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_paths_reach_config_loading() {
        let cli = Cli::try_parse_from([
            "autofill",
            "--workspace",
            "/w",
            "--config",
            "x.yaml",
            "status",
        ])
        .unwrap();

        assert_eq!(cli.workspace, Some(PathBuf::from("/w")));
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
    }

    #[test]
    fn test_parse_ask_requires_question() {
        assert!(Cli::try_parse_from(["autofill", "ask"]).is_err());
        assert!(Cli::try_parse_from(["autofill", "ask", "Do you support SSO?"]).is_ok());
    }
}

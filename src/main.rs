//! Candle signal engine CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use signals_config::{load_config, AppConfig, LogFormat};
use signals_monitor::setup_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)
            .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    // Setup logging
    let log_level = match cli.log_level {
        Some(cli::LogLevel::Trace) => "trace",
        Some(cli::LogLevel::Debug) => "debug",
        Some(cli::LogLevel::Info) => "info",
        Some(cli::LogLevel::Warn) => "warn",
        Some(cli::LogLevel::Error) => "error",
        None => config.logging.level.as_str(),
    };
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        config.logging.log_format()
    };
    setup_logging(log_level, format, config.logging.file.as_deref())
        .context("Failed to initialise logging")?;

    // Execute command
    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, &config),
        Commands::Strategies => cli::commands::strategies::run(),
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config),
    }
}

//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use signals_core::Timeframe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signals")]
#[command(author, version, about = "Candle indicator and entry/exit signal engine")]
pub struct Cli {
    /// Configuration file path; skipped when missing
    #[arg(short, long, default_value = "config/default.toml", env = "SIGNALS_CONFIG")]
    pub config: PathBuf,

    /// Log level, overrides the configured one
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Annotate a candle file with indicators and signals
    Analyze(AnalyzeArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

/// An informative table given as `PAIR:TIMEFRAME=PATH`.
#[derive(Debug, Clone)]
pub struct InformativeArg {
    pub pair: String,
    pub timeframe: Timeframe,
    pub path: PathBuf,
}

fn parse_informative(s: &str) -> Result<InformativeArg, String> {
    let (key, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PAIR:TIMEFRAME=PATH, got '{s}'"))?;
    let (pair, timeframe) = key
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PAIR:TIMEFRAME before '=', got '{key}'"))?;
    if pair.is_empty() || path.is_empty() {
        return Err(format!("expected PAIR:TIMEFRAME=PATH, got '{s}'"));
    }
    Ok(InformativeArg {
        pair: pair.to_string(),
        timeframe: timeframe.parse()?,
        path: PathBuf::from(path),
    })
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Built-in strategy to run (see `strategies`)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Declarative strategy file (TOML or JSON), used instead of --strategy
    #[arg(long, conflicts_with = "strategy")]
    pub rules: Option<PathBuf>,

    /// Strategy parameters file (TOML or JSON)
    #[arg(long, conflicts_with = "rules")]
    pub params: Option<PathBuf>,

    /// Candle data file (CSV)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Pair name of the data file
    #[arg(short, long)]
    pub pair: Option<String>,

    /// Timeframe of the data file
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Informative data, `PAIR:TIMEFRAME=PATH`; repeatable
    #[arg(long, value_parser = parse_informative)]
    pub informative: Vec<InformativeArg>,

    /// Write the annotated table to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Query the custom stoploss for a trade at this profit ratio on the
    /// newest candle
    #[arg(long)]
    pub current_profit: Option<f64>,
}

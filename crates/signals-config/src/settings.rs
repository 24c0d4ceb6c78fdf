//! Configuration structures.

use serde::{Deserialize, Serialize};
use signals_core::Timeframe;
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), String> {
        if LogFormat::parse(&self.logging.format).is_none() {
            return Err(format!(
                "Unknown log format '{}', expected pretty, json or compact",
                self.logging.format
            ));
        }
        if self.strategy.name.trim().is_empty() {
            return Err("Strategy name must not be empty".to_string());
        }
        if !(self.strategy.params.is_null() || self.strategy.params.is_object()) {
            return Err("Strategy params must be a table".to_string());
        }
        for informative in &self.data.informative {
            if informative.timeframe < self.data.timeframe {
                return Err(format!(
                    "Informative {} {} is faster than the primary timeframe {}",
                    informative.pair, informative.timeframe, self.data.timeframe
                ));
            }
        }
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signals".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Parsed format; unknown names fall back to pretty.
    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.format).unwrap_or(LogFormat::Pretty)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    /// Registry key of a built-in strategy
    pub name: String,
    /// Strategy parameters; missing fields keep their defaults
    #[serde(default)]
    pub params: serde_json::Value,
    /// Declarative strategy file, used instead of `name` when set
    #[serde(default)]
    pub rules: Option<PathBuf>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "hull_suite".to_string(),
            params: serde_json::Value::Null,
            rules: None,
        }
    }
}

/// Candle data inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    pub pair: String,
    pub timeframe: Timeframe,
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub informative: Vec<InformativeSource>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            pair: "BTC/USDT".to_string(),
            timeframe: Timeframe::Hour4,
            path: None,
            informative: Vec::new(),
        }
    }
}

/// An additional pair loaded for informative merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformativeSource {
    pub pair: String,
    pub timeframe: Timeframe,
    pub path: PathBuf,
}

//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSettings, InformativeSource, LogFormat, LoggingConfig,
    StrategySettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

fn environment() -> Environment {
    Environment::with_prefix("SIGNALS")
        .separator("__")
        .try_parsing(true)
}

fn finish(config: Config) -> Result<AppConfig, ConfigError> {
    let app: AppConfig = config.try_deserialize()?;
    app.validate().map_err(ConfigError::Message)?;
    Ok(app)
}

/// Load configuration from file and environment.
///
/// Environment variables override file values, e.g.
/// `SIGNALS__LOGGING__LEVEL=debug`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment())
        .build()?;

    finish(config)
}

/// Parse configuration from TOML text, without environment overrides.
pub fn load_config_str(text: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(text, FileFormat::Toml))
        .build()?;

    finish(config)
}

//! Validate configuration command.

use anyhow::Result;
use signals_config::load_config;
use signals_strategies::{RuleStrategy, Strategy, StrategyRegistry};
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    // the strategy section must also build
    let strategy = match &config.strategy.rules {
        Some(path) => RuleStrategy::from_path(path).map(|s| s.name().to_string()),
        None => StrategyRegistry::new()
            .create(&config.strategy.name, config.strategy.params.clone())
            .map(|s| s.name().to_string()),
    };
    let strategy = match strategy {
        Ok(name) => name,
        Err(e) => {
            println!("Strategy error: {}", e);
            return Err(e.into());
        }
    };

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Log format: {}", config.logging.format);
    println!("Strategy: {}", strategy);
    println!("Data: {} {}", config.data.pair, config.data.timeframe);
    for informative in &config.data.informative {
        println!("Informative: {} {} ({})", informative.pair, informative.timeframe, informative.path.display());
    }

    Ok(())
}

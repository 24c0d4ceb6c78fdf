//! Analyze command implementation.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use signals_config::{AppConfig, InformativeSource};
use signals_core::Timeframe;
use signals_data::{load_csv, write_csv, CandleStore};
use signals_indicators::IndicatorCache;
use signals_monitor::SignalReport;
use signals_risk::{MemoryStoplossStore, StoplossQuery};
use signals_strategies::{RuleStrategy, Strategy, StrategyRegistry};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;

pub fn run(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let strategy = build_strategy(&args, config)?;
    info!("Running strategy: {}", strategy.name());

    let Some(data_path) = args.data.clone().or_else(|| config.data.path.clone()) else {
        bail!("Please provide a candle file with --data (e.g. --data data/BTC_USDT-4h.csv)");
    };
    let pair = args.pair.clone().unwrap_or_else(|| config.data.pair.clone());
    let timeframe = args.timeframe.unwrap_or(config.data.timeframe);
    if timeframe != strategy.metadata().timeframe {
        warn!(
            data = %timeframe,
            strategy = %strategy.metadata().timeframe,
            "Data timeframe differs from the strategy timeframe"
        );
    }

    let mut table = load_csv(&data_path, &pair, timeframe)
        .with_context(|| format!("Failed to load {}", data_path.display()))?;
    let store = load_informative(&args, config)?;
    for wanted in strategy.informative_pairs() {
        if !store
            .pairs()
            .any(|(p, tf)| p == wanted.pair && tf == wanted.timeframe)
        {
            warn!("Informative data {} not provided", wanted);
        }
    }

    let mut cache = IndicatorCache::new();
    let signals = strategy
        .analyze(&mut table, &store, &mut cache)
        .context("Analysis failed")?;

    let report = SignalReport::new(strategy.name(), strategy.metadata(), &table, &signals);
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.summary());
    }

    if let Some(profit) = args.current_profit {
        print_stoploss(strategy.as_ref(), &table, &pair, profit)?;
    }

    if let Some(output) = &args.output {
        write_csv(&table, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Annotated table saved to {:?}", output);
    }

    Ok(())
}

fn build_strategy(args: &AnalyzeArgs, config: &AppConfig) -> Result<Box<dyn Strategy>> {
    let rules = args
        .rules
        .clone()
        .or_else(|| if args.strategy.is_none() { config.strategy.rules.clone() } else { None });
    if let Some(path) = rules {
        let strategy = RuleStrategy::from_path(&path)
            .with_context(|| format!("Failed to load rules {}", path.display()))?;
        return Ok(Box::new(strategy));
    }

    let registry = StrategyRegistry::new();
    let name = args.strategy.as_deref().unwrap_or(&config.strategy.name);
    if !registry.exists(name) {
        bail!(
            "Unknown strategy '{name}'. Available: {}",
            registry.names().join(", ")
        );
    }

    let params = match &args.params {
        Some(path) => read_params(path)?,
        // configured params belong to the configured strategy only
        None if name == config.strategy.name => config.strategy.params.clone(),
        None => serde_json::Value::Null,
    };
    registry
        .create(name, params)
        .context("Failed to create strategy")
}

fn read_params(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => toml::from_str(&text)?,
    };
    Ok(value)
}

fn load_informative(args: &AnalyzeArgs, config: &AppConfig) -> Result<CandleStore> {
    let sources: Vec<(String, Timeframe, PathBuf)> = config
        .data
        .informative
        .iter()
        .map(|InformativeSource { pair, timeframe, path }| (pair.clone(), *timeframe, path.clone()))
        .chain(
            args.informative
                .iter()
                .map(|i| (i.pair.clone(), i.timeframe, i.path.clone())),
        )
        .collect();

    let mut store = CandleStore::new();
    for (pair, timeframe, path) in sources {
        let table = load_csv(&path, &pair, timeframe)
            .with_context(|| format!("Failed to load informative {}", path.display()))?;
        // later sources replace earlier ones for the same pair
        store.insert(table);
    }
    if !store.is_empty() {
        info!("Loaded {} informative tables", store.len());
    }
    Ok(store)
}

fn print_stoploss(
    strategy: &dyn Strategy,
    table: &signals_core::CandleTable,
    pair: &str,
    profit: f64,
) -> Result<()> {
    let Some(last) = table.last_candle() else {
        bail!("Cannot query a stoploss on an empty table");
    };
    let query = StoplossQuery {
        pair: pair.to_string(),
        trade_id: 1,
        current_time: Utc::now(),
        current_rate: last.close,
        current_profit: profit,
    };

    let mut store = MemoryStoplossStore::new();
    match strategy.custom_stoploss(&query, table, &mut store) {
        Some(stop) => println!("Custom stoploss at {:.2}% profit: {:.6}", profit * 100.0, stop),
        None => println!(
            "No custom stoploss, default {:.2}% applies",
            strategy.metadata().stoploss * 100.0
        ),
    }
    Ok(())
}
